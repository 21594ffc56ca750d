//! Single data layer of a grid map

use serde::{Deserialize, Serialize};

use crate::{GridMapError, Index};

/// Column-major `size x size` sample storage addressed by storage slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    size: usize,
    data: Vec<f32>,
}

impl Layer {
    /// Create a layer filled with `value`
    pub fn filled(size: usize, value: f32) -> Self {
        Self {
            size,
            data: vec![value; size * size],
        }
    }

    /// Cells per side
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sample at a storage slot
    #[inline]
    pub fn get(&self, index: Index) -> f32 {
        self.data[self.offset(index)]
    }

    /// Overwrite the sample at a storage slot
    #[inline]
    pub fn set(&mut self, index: Index, value: f32) {
        let offset = self.offset(index);
        self.data[offset] = value;
    }

    /// Overwrite every sample
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Raw column-major samples
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Check that the storage holds exactly `size * size` samples
    pub fn validate(&self) -> Result<(), GridMapError> {
        let expected = self.size.checked_mul(self.size);
        if expected != Some(self.data.len()) {
            return Err(GridMapError::corrupt(format!(
                "layer of side {} holds {} samples",
                self.size,
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Number of non-NaN samples
    pub fn observed_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }

    #[inline]
    fn offset(&self, index: Index) -> usize {
        debug_assert!(index.row < self.size && index.col < self.size);
        index.col * self.size + index.row
    }
}
