//! Grid map error types

use thiserror::Error;

/// Errors raised while building or checking a map
#[derive(Debug, Error, PartialEq)]
pub enum GridMapError {
    /// Resolution must be a positive finite number
    #[error("invalid resolution {resolution}: must be > 0")]
    InvalidResolution { resolution: f64 },

    /// Side length must be a positive finite number
    #[error("invalid map length {length} along {axis}: must be > 0")]
    InvalidLength { axis: &'static str, length: f64 },

    /// Lengths produced different cell counts per axis
    #[error("grid must be square, got {size_x}x{size_y} cells")]
    NonSquare { size_x: usize, size_y: usize },

    /// More cells per side than a map may allocate
    #[error("grid of {size} cells per side exceeds the limit of {max}")]
    TooLarge { size: usize, max: usize },

    /// Deserialized map whose parts disagree
    #[error("corrupt grid map: {reason}")]
    Corrupt { reason: String },
}

impl GridMapError {
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self::Corrupt {
            reason: reason.into(),
        }
    }
}
