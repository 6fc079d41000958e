use crate::cell::{Cell, Position};
use crate::error::GridError;
use crate::policy::SpreadPolicy;
use crate::seed::{fold_seed, generate_seed};
use crate::terrain::{Rgb, Terrain};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::ops::Index;
use tracing::{debug, trace};

// down, up, right, left
const ORTHOGONAL: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Dense row-major terrain map and the stepping loop that evolves it.
///
/// The grid owns its PRNG: the seed string is folded once at construction
/// and every later draw (seed placement, infection rolls) comes from that
/// generator, so equal seeds and dimensions replay identically.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    seed: String,
    cells: Vec<Cell>,
    policy: SpreadPolicy,
    rng: StdRng,
    generation: u64,
    last_changes: usize,
}

impl Grid {
    /// Builds a grid with the default spread policy. A missing or empty seed
    /// is replaced by a generated one.
    pub fn new(rows: usize, cols: usize, seed: Option<&str>) -> Result<Self, GridError> {
        Self::with_policy(rows, cols, seed, SpreadPolicy::default())
    }

    pub fn with_policy(
        rows: usize,
        cols: usize,
        seed: Option<&str>,
        policy: SpreadPolicy,
    ) -> Result<Self, GridError> {
        let seed = match seed {
            Some(s) if !s.is_empty() => s.to_owned(),
            _ => generate_seed(),
        };
        let mut grid = Self::empty(rows, cols, &seed, policy)?;
        grid.place_seeds()?;
        Ok(grid)
    }

    /// All-void grid with no terrain seeds placed.
    pub fn empty(
        rows: usize,
        cols: usize,
        seed: &str,
        policy: SpreadPolicy,
    ) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimension { rows, cols });
        }
        policy.validate()?;

        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Cell::void(Position::new(row, col))))
            .collect();

        Ok(Self {
            rows,
            cols,
            seed: seed.to_owned(),
            cells,
            policy,
            rng: StdRng::seed_from_u64(fold_seed(seed)),
            generation: 0,
            last_changes: 0,
        })
    }

    fn place_seeds(&mut self) -> Result<(), GridError> {
        let required = Terrain::SEEDS.len();
        let capacity = self.cells.len();
        if capacity < required {
            return Err(GridError::InsufficientCapacity {
                rows: self.rows,
                cols: self.cols,
                capacity,
                required,
            });
        }

        debug!(rows = self.rows, cols = self.cols, seed = %self.seed, "placing terrain seeds");
        let mut used = vec![false; capacity];
        for terrain in Terrain::SEEDS {
            let idx = loop {
                let row = self.rng.gen_range(0..self.rows);
                let col = self.rng.gen_range(0..self.cols);
                let idx = self.idx(row, col);
                if !used[idx] {
                    break idx;
                }
            };
            used[idx] = true;
            self.cells[idx].convert(terrain);
            let Position { row, col } = self.cells[idx].position();
            debug!(%terrain, row, col, "seeded");
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn policy(&self) -> &SpreadPolicy {
        &self.policy
    }

    /// Completed steps.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cells converted during the most recent step.
    pub fn last_step_changes(&self) -> usize {
        self.last_changes
    }

    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn check(&self, row: usize, col: usize) -> Result<usize, GridError> {
        if row < self.rows && col < self.cols {
            Ok(self.idx(row, col))
        } else {
            Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub fn row(&self, row: usize) -> Result<&[Cell], GridError> {
        self.check(row, 0)?;
        let start = self.idx(row, 0);
        Ok(&self.cells[start..start + self.cols])
    }

    pub fn cell(&self, row: usize, col: usize) -> Result<&Cell, GridError> {
        let idx = self.check(row, col)?;
        Ok(&self.cells[idx])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Overwrites the terrain at a location between ticks. Age is kept.
    pub fn set_terrain(&mut self, row: usize, col: usize, terrain: Terrain) -> Result<(), GridError> {
        let idx = self.check(row, col)?;
        self.cells[idx].convert(terrain);
        Ok(())
    }

    /// Cells of `terrain` in the 3x3 window around (row, col), the center
    /// included. The window is clamped at the edges.
    pub fn count_neighbors_of(
        &self,
        row: usize,
        col: usize,
        terrain: Terrain,
    ) -> Result<u8, GridError> {
        self.check(row, col)?;
        Ok(self.window_count(row, col, terrain))
    }

    /// Same-terrain count around a cell; the coefficient fed to conditional spreaders.
    pub fn count_same_type_neighbors(&self, row: usize, col: usize) -> Result<u8, GridError> {
        let idx = self.check(row, col)?;
        Ok(self.window_count(row, col, self.cells[idx].terrain()))
    }

    fn window_count(&self, row: usize, col: usize, terrain: Terrain) -> u8 {
        let rows = row.saturating_sub(1)..(row + 2).min(self.rows);
        let mut count = 0;
        for r in rows {
            for c in col.saturating_sub(1)..(col + 2).min(self.cols) {
                if self.cells[self.idx(r, c)].terrain() == terrain {
                    count += 1;
                }
            }
        }
        count
    }

    /// In-bounds orthogonal neighbors, ordered down, up, right, left.
    pub fn orthogonal_neighbors(&self, row: usize, col: usize) -> Result<Vec<&Cell>, GridError> {
        self.check(row, col)?;
        Ok(self
            .orthogonal(row, col)
            .into_iter()
            .flatten()
            .map(|i| &self.cells[i])
            .collect())
    }

    fn orthogonal(&self, row: usize, col: usize) -> [Option<usize>; 4] {
        ORTHOGONAL.map(|(dr, dc)| {
            let r = row.checked_add_signed(dr).filter(|&r| r < self.rows)?;
            let c = col.checked_add_signed(dc).filter(|&c| c < self.cols)?;
            Some(self.idx(r, c))
        })
    }

    fn coeff_for(&self, idx: usize) -> Option<u8> {
        let cell = &self.cells[idx];
        if cell.terrain().is_unconditional() {
            None
        } else {
            let Position { row, col } = cell.position();
            Some(self.window_count(row, col, cell.terrain()))
        }
    }

    /// Advances the map by one tick.
    ///
    /// Cells are visited in row-major order. A cell converted earlier in the
    /// tick neither spreads nor ages until the next one, which bounds spread
    /// to one cell of distance per tick.
    pub fn step(&mut self) {
        let mut changes = 0;
        for i in 0..self.cells.len() {
            if self.cells[i].changed {
                continue;
            }
            let source = self.cells[i];
            let coeff = self.coeff_for(i);
            let Position { row, col } = source.position();

            for j in self.orthogonal(row, col).into_iter().flatten() {
                if self.cells[j].changed {
                    continue;
                }
                if source.infect(&mut self.cells[j], coeff, &self.policy, &mut self.rng) {
                    changes += 1;
                }
            }
            self.cells[i].tick_age();
        }

        for cell in &mut self.cells {
            cell.changed = false;
        }
        self.generation += 1;
        self.last_changes = changes;
        trace!(generation = self.generation, changes, "step");
    }

    /// True when no cell can convert any neighbor under the current policy.
    pub fn is_stable(&self) -> bool {
        (0..self.cells.len()).all(|i| {
            let source = self.cells[i].terrain();
            let coeff = self.coeff_for(i);
            let Position { row, col } = self.cells[i].position();
            self.orthogonal(row, col)
                .into_iter()
                .flatten()
                .all(|j| self.policy.chance(source, self.cells[j].terrain(), coeff) <= 0.0)
        })
    }

    /// Cell counts per terrain, indexed by [`Terrain::index`].
    pub fn census(&self) -> [usize; Terrain::ALL.len()] {
        let mut counts = [0; Terrain::ALL.len()];
        for cell in &self.cells {
            counts[cell.terrain().index()] += 1;
        }
        counts
    }

    pub fn colors(&self) -> Vec<Vec<Rgb>> {
        self.iter_rows()
            .map(|row| row.iter().map(Cell::color).collect())
            .collect()
    }
}

impl Index<usize> for Grid {
    type Output = [Cell];

    /// Panics when `row` is out of range; see [`Grid::row`] for the checked form.
    fn index(&self, row: usize) -> &[Cell] {
        assert!(row < self.rows, "row {row} out of range for {} rows", self.rows);
        let start = self.idx(row, 0);
        &self.cells[start..start + self.cols]
    }
}
