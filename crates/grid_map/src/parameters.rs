//! Map geometry parameters

use serde::{Deserialize, Serialize};

use crate::GridMapError;

/// Largest accepted grid side, 64 MiB of `f32` per layer
pub const MAX_CELLS_PER_SIDE: usize = 4096;

/// Geometry of a square grid map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapParameters {
    /// Side length in metres (snapped to `size * resolution`)
    pub length: f64,
    /// Cell edge length in metres
    pub resolution: f64,
    /// Cells per side
    pub size: usize,
    /// World position of the map centre `(x, y)`
    pub position: (f64, f64),
}

impl MapParameters {
    /// Build parameters centred on the origin.
    ///
    /// # Errors
    /// Non-positive resolution or lengths, lengths that do not produce a
    /// square grid, or a side above [`MAX_CELLS_PER_SIDE`].
    pub fn new(length_x: f64, length_y: f64, resolution: f64) -> Result<Self, GridMapError> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(GridMapError::InvalidResolution { resolution });
        }
        let size_x = cells_for(length_x, resolution, "x")?;
        let size_y = cells_for(length_y, resolution, "y")?;
        if size_x != size_y {
            return Err(GridMapError::NonSquare { size_x, size_y });
        }
        if size_x > MAX_CELLS_PER_SIDE {
            return Err(GridMapError::TooLarge {
                size: size_x,
                max: MAX_CELLS_PER_SIDE,
            });
        }

        Ok(Self {
            length: size_x as f64 * resolution,
            resolution,
            size: size_x,
            position: (0.0, 0.0),
        })
    }

    /// Same geometry centred on `position`
    pub fn centred_at(mut self, x: f64, y: f64) -> Self {
        self.position = (x, y);
        self
    }

    /// Number of cells in the grid
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    /// World-frame bounds as `((min_x, min_y), (max_x, max_y))`
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let half = self.length / 2.0;
        let (x, y) = self.position;
        ((x - half, y - half), (x + half, y + half))
    }
}

fn cells_for(length: f64, resolution: f64, axis: &'static str) -> Result<usize, GridMapError> {
    if !(length.is_finite() && length > 0.0) {
        return Err(GridMapError::InvalidLength { axis, length });
    }
    let cells = (length / resolution).round();
    if cells < 1.0 {
        return Err(GridMapError::InvalidLength { axis, length });
    }
    Ok(cells as usize)
}
