use crate::terrain::Terrain;
use thiserror::Error;

/// Errors raised while building or addressing a [`Grid`](crate::Grid).
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimension { rows: usize, cols: usize },
    #[error("a {rows}x{cols} grid has {capacity} cells but {required} seeds must be placed")]
    InsufficientCapacity {
        rows: usize,
        cols: usize,
        capacity: usize,
        required: usize,
    },
    #[error("cell ({row}, {col}) is outside a {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("invalid spread policy: {0}")]
    InvalidPolicy(#[from] PolicyError),
}

/// Errors raised when validating a [`SpreadPolicy`](crate::SpreadPolicy).
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("{terrain} {field} chance {value} must be between 0.0 and 1.0")]
    ChanceOutOfRange {
        terrain: Terrain,
        field: &'static str,
        value: f64,
    },
    #[error("{terrain} lists itself as a victim")]
    SelfVictim { terrain: Terrain },
}
