//! GenericImage - dense single-channel image

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Dense `width x height` float image, `NaN` marks unobserved samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
    pub time: Timestamp,
}

impl GenericImage {
    /// Image filled with `NaN`
    pub fn unobserved(width: usize, height: usize, time: Timestamp) -> Self {
        Self {
            width,
            height,
            data: vec![f32::NAN; width * height],
            time,
        }
    }

    /// Number of non-NaN samples
    pub fn observed_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }

    /// Bitwise sample equality (`NaN == NaN`)
    pub fn same_samples(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}
