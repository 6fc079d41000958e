use crate::policy::SpreadPolicy;
use crate::terrain::{Rgb, Terrain};
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// State of one grid location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    position: Position,
    terrain: Terrain,
    age: u32,
    active: bool,
    pub(crate) changed: bool,
}

impl Cell {
    pub(crate) fn void(position: Position) -> Self {
        Self {
            position,
            terrain: Terrain::Void,
            age: 0,
            active: false,
            changed: false,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Ticks this cell has spent active.
    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Written during the tick currently in progress.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn color(&self) -> Rgb {
        self.terrain.color()
    }

    /// Rolls this cell's spread rule against `neighbor`. Returns whether the
    /// neighbor was converted.
    pub fn infect<R: Rng + ?Sized>(
        &self,
        neighbor: &mut Cell,
        coeff: Option<u8>,
        policy: &SpreadPolicy,
        rng: &mut R,
    ) -> bool {
        if neighbor.changed {
            return false;
        }
        let chance = policy.chance(self.terrain, neighbor.terrain, coeff);
        if chance <= 0.0 || !rng.gen_bool(chance.min(1.0)) {
            return false;
        }
        neighbor.convert(self.terrain);
        neighbor.changed = true;
        true
    }

    /// Age is kept across conversions; it only ever grows.
    pub(crate) fn convert(&mut self, terrain: Terrain) {
        self.terrain = terrain;
        self.active = !terrain.is_void();
    }

    pub(crate) fn tick_age(&mut self) {
        if self.active {
            self.age = self.age.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::SpreadRule;
    use rand::{rngs::StdRng, SeedableRng};

    fn cell(terrain: Terrain) -> Cell {
        let mut c = Cell::void(Position::new(0, 0));
        c.convert(terrain);
        c
    }

    fn always(source: Terrain) -> SpreadPolicy {
        let mut policy = SpreadPolicy::frozen();
        policy.set_rule(
            source,
            SpreadRule {
                claim: 1.0,
                overtake: 1.0,
                victims: vec![Terrain::Plains],
            },
        );
        policy
    }

    #[test]
    fn new_cells_are_void_and_idle() {
        let c = Cell::void(Position::new(3, 4));
        assert_eq!(c.terrain(), Terrain::Void);
        assert_eq!(c.age(), 0);
        assert!(!c.is_active());
        assert!(!c.is_changed());
        assert_eq!(c.position(), Position::new(3, 4));
    }

    #[test]
    fn certain_infection_converts_and_marks() {
        let mut rng = StdRng::seed_from_u64(1);
        let water = cell(Terrain::Water);
        let mut target = Cell::void(Position::new(0, 1));

        assert!(water.infect(&mut target, None, &always(Terrain::Water), &mut rng));
        assert_eq!(target.terrain(), Terrain::Water);
        assert!(target.is_active());
        assert!(target.is_changed());
    }

    #[test]
    fn changed_neighbors_are_left_alone() {
        let mut rng = StdRng::seed_from_u64(2);
        let water = cell(Terrain::Water);
        let mut target = Cell::void(Position::new(0, 1));
        target.changed = true;

        assert!(!water.infect(&mut target, None, &always(Terrain::Water), &mut rng));
        assert_eq!(target.terrain(), Terrain::Void);
    }

    #[test]
    fn non_victims_are_never_converted() {
        let mut rng = StdRng::seed_from_u64(3);
        let water = cell(Terrain::Water);
        let mut desert = cell(Terrain::Desert);

        for _ in 0..100 {
            assert!(!water.infect(&mut desert, None, &always(Terrain::Water), &mut rng));
        }
        assert_eq!(desert.terrain(), Terrain::Desert);
    }

    #[test]
    fn overtaking_keeps_age() {
        let mut rng = StdRng::seed_from_u64(4);
        let water = cell(Terrain::Water);
        let mut plains = cell(Terrain::Plains);
        for _ in 0..5 {
            plains.tick_age();
        }

        assert!(water.infect(&mut plains, None, &always(Terrain::Water), &mut rng));
        assert_eq!(plains.terrain(), Terrain::Water);
        assert_eq!(plains.age(), 5);
    }

    #[test]
    fn void_cells_do_not_age() {
        let mut c = Cell::void(Position::new(0, 0));
        c.tick_age();
        assert_eq!(c.age(), 0);

        let mut f = cell(Terrain::Forest);
        f.tick_age();
        f.tick_age();
        assert_eq!(f.age(), 2);
    }
}
