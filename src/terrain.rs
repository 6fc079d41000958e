use serde::{Deserialize, Serialize};
use std::fmt;

/// 24-bit display color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The fixed set of terrain kinds a cell can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Void,
    Water,
    Plains,
    Desert,
    Forest,
    Mountain,
    Swamp,
    Snowy,
}

impl Terrain {
    pub const ALL: [Terrain; 8] = [
        Terrain::Void,
        Terrain::Water,
        Terrain::Plains,
        Terrain::Desert,
        Terrain::Forest,
        Terrain::Mountain,
        Terrain::Swamp,
        Terrain::Snowy,
    ];

    /// Placement order used when seeding a fresh grid.
    pub const SEEDS: [Terrain; 7] = [
        Terrain::Water,
        Terrain::Plains,
        Terrain::Desert,
        Terrain::Forest,
        Terrain::Mountain,
        Terrain::Swamp,
        Terrain::Snowy,
    ];

    pub fn color(self) -> Rgb {
        match self {
            Terrain::Void => Rgb::new(18, 18, 24),
            Terrain::Water => Rgb::new(38, 104, 196),
            Terrain::Plains => Rgb::new(126, 192, 84),
            Terrain::Desert => Rgb::new(232, 208, 136),
            Terrain::Forest => Rgb::new(28, 108, 52),
            Terrain::Mountain => Rgb::new(128, 118, 110),
            Terrain::Swamp => Rgb::new(84, 100, 62),
            Terrain::Snowy => Rgb::new(238, 244, 250),
        }
    }

    /// Unconditional spreaders ignore how many same-type cells surround them.
    pub fn is_unconditional(self) -> bool {
        matches!(self, Terrain::Water | Terrain::Void | Terrain::Swamp)
    }

    pub fn is_void(self) -> bool {
        self == Terrain::Void
    }

    pub fn name(self) -> &'static str {
        match self {
            Terrain::Void => "void",
            Terrain::Water => "water",
            Terrain::Plains => "plains",
            Terrain::Desert => "desert",
            Terrain::Forest => "forest",
            Terrain::Mountain => "mountain",
            Terrain::Swamp => "swamp",
            Terrain::Snowy => "snowy",
        }
    }

    /// Dense index into [`Terrain::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
