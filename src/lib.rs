//! Procedural terrain maps grown by neighborhood "infection".
//!
//! A [`Grid`] is seeded with one cell of every non-void [`Terrain`] and then
//! advanced one tick at a time with [`Grid::step`]. Each tick, terrain spreads
//! into orthogonal neighbors with a chance supplied by the grid's
//! [`SpreadPolicy`]. Renderers poll [`Grid::colors`] between ticks.

pub mod cell;
pub mod error;
pub mod grid;
pub mod policy;
pub mod seed;
pub mod terrain;

pub use cell::{Cell, Position};
pub use error::{GridError, PolicyError};
pub use grid::Grid;
pub use policy::{SpreadPolicy, SpreadRule};
pub use seed::generate_seed;
pub use terrain::{Rgb, Terrain};
