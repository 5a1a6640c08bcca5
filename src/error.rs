use thiserror::Error;

use crate::grid::Position;

pub type Result<T> = std::result::Result<T, Error>;

/// Invalid grid, terminal, start or run-loop configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
    #[error("{role} position {position} lies outside the {width}x{height} grid")]
    OutsideGrid {
        role: &'static str,
        position: Position,
        width: usize,
        height: usize,
    },
    #[error("{first} and {second} both occupy {position}")]
    Overlap {
        first: &'static str,
        second: &'static str,
        position: Position,
    },
    #[error("no start position supplied")]
    MissingStart,
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
    #[error("discount factor must lie in [0, 1], got {0}")]
    Discount(f64),
    #[error("convergence threshold must be positive, got {0}")]
    Threshold(f64),
    #[error("unable to read configuration file {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// A positional lookup outside the grid extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("position {position} is outside the {width}x{height} grid")]
pub struct OutOfBoundsError {
    pub position: Position,
    pub width: usize,
    pub height: usize,
}

/// Movement probabilities that are negative or do not sum to one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidProbabilityError {
    #[error("{name} probability must be a non-negative finite number, got {value}")]
    OutOfRange { name: &'static str, value: f64 },
    #[error("movement probabilities must sum to 1, got {0}")]
    BadSum(f64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBoundsError),
    #[error(transparent)]
    InvalidProbability(#[from] InvalidProbabilityError),
}
