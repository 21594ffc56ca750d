//! Rolling elevation grid

use serde::{Deserialize, Serialize};

use crate::index::{shift_start, unwrap_index, wrap_index, Index};
use crate::{GridIterator, GridMapError, Layer, MapParameters, MAX_CELLS_PER_SIDE};

/// Square circular-buffer grid holding a mean-elevation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMap {
    params: MapParameters,
    /// Storage slot of unwrapped index `(0, 0)`
    start: Index,
    /// Engine time of the last update (microseconds)
    timestamp_us: u64,
    mean_z: Layer,
}

impl GridMap {
    /// Create an empty (all `NaN`) map
    pub fn new(params: MapParameters) -> Self {
        Self {
            mean_z: Layer::filled(params.size, f32::NAN),
            params,
            start: Index::default(),
            timestamp_us: 0,
        }
    }

    #[inline]
    pub fn parameters(&self) -> &MapParameters {
        &self.params
    }

    /// Cells per side
    #[inline]
    pub fn size(&self) -> usize {
        self.params.size
    }

    /// Current circular-buffer start index
    #[inline]
    pub fn start_index(&self) -> Index {
        self.start
    }

    /// Timestamp in microseconds
    #[inline]
    pub fn timestamp(&self) -> u64 {
        self.timestamp_us
    }

    pub fn set_timestamp(&mut self, timestamp_us: u64) {
        self.timestamp_us = timestamp_us;
    }

    /// Mean elevation layer, addressed by storage slot
    #[inline]
    pub fn mean_z(&self) -> &Layer {
        &self.mean_z
    }

    #[inline]
    pub fn mean_z_mut(&mut self) -> &mut Layer {
        &mut self.mean_z
    }

    /// Iterate every cell in storage order
    #[inline]
    pub fn iter(&self) -> GridIterator {
        GridIterator::new(self.params.size, self.start)
    }

    /// Storage slot of a logical index
    #[inline]
    pub fn wrapped_index(&self, unwrapped: Index) -> Index {
        wrap_index(unwrapped, self.start, self.params.size)
    }

    /// Logical index of a storage slot
    #[inline]
    pub fn unwrapped_index(&self, wrapped: Index) -> Index {
        unwrap_index(wrapped, self.start, self.params.size)
    }

    /// Storage slot containing a world position, `None` outside the map
    pub fn index_at(&self, x: f64, y: f64) -> Option<Index> {
        let half = self.params.length / 2.0;
        let (cx, cy) = self.params.position;
        let row = ((cx + half - x) / self.params.resolution).floor();
        let col = ((cy + half - y) / self.params.resolution).floor();

        let size = self.params.size as f64;
        if !(0.0..size).contains(&row) || !(0.0..size).contains(&col) {
            return None;
        }
        Some(self.wrapped_index(Index::new(row as usize, col as usize)))
    }

    /// World `(x, y)` of the centre of a storage slot
    pub fn position_at(&self, index: Index) -> (f64, f64) {
        let unwrapped = self.unwrapped_index(index);
        let half = self.params.length / 2.0;
        let res = self.params.resolution;
        let (cx, cy) = self.params.position;
        (
            cx + half - (unwrapped.row as f64 + 0.5) * res,
            cy + half - (unwrapped.col as f64 + 0.5) * res,
        )
    }

    /// World-frame point of a cell, `z` read from `layer` at the storage slot.
    ///
    /// `NaN` samples produce a point with `NaN` z.
    pub fn point_from_index(&self, index: Index, layer: &Layer) -> [f64; 3] {
        let (x, y) = self.position_at(index);
        [x, y, f64::from(layer.get(index))]
    }

    /// Mean elevation at a world position
    pub fn elevation_at(&self, x: f64, y: f64) -> Option<f32> {
        self.index_at(x, y).map(|index| self.mean_z.get(index))
    }

    /// Write the mean elevation at a world position.
    ///
    /// Returns `false` if the position is outside the map.
    pub fn set_elevation_at(&mut self, x: f64, y: f64, z: f32) -> bool {
        match self.index_at(x, y) {
            Some(index) => {
                self.mean_z.set(index, z);
                true
            }
            None => false,
        }
    }

    /// Re-centre the map on `(x, y)`, snapped to whole cells.
    ///
    /// Only the buffer start index changes. Cells that scroll in are reset to
    /// `NaN`. Returns the applied `(row, col)` shift.
    pub fn move_to(&mut self, x: f64, y: f64) -> (i64, i64) {
        let res = self.params.resolution;
        let (cx, cy) = self.params.position;
        let row_shift = ((x - cx) / res).round() as i64;
        let col_shift = ((y - cy) / res).round() as i64;
        if row_shift == 0 && col_shift == 0 {
            return (0, 0);
        }

        let size = self.params.size;
        self.start = Index::new(
            shift_start(self.start.row, row_shift, size),
            shift_start(self.start.col, col_shift, size),
        );
        self.params.position = (cx + row_shift as f64 * res, cy + col_shift as f64 * res);

        for row in scrolled_in(row_shift, size) {
            for col in 0..size {
                let slot = self.wrapped_index(Index::new(row, col));
                self.mean_z.set(slot, f32::NAN);
            }
        }
        for col in scrolled_in(col_shift, size) {
            for row in 0..size {
                let slot = self.wrapped_index(Index::new(row, col));
                self.mean_z.set(slot, f32::NAN);
            }
        }

        (row_shift, col_shift)
    }

    /// Check the invariants a deserialized map cannot guarantee.
    ///
    /// Every accessor assumes them; call this before using a map read from
    /// outside the process.
    pub fn validate(&self) -> Result<(), GridMapError> {
        let params = &self.params;
        let size = params.size;
        if size == 0 || size > MAX_CELLS_PER_SIDE {
            return Err(GridMapError::corrupt(format!("side of {size} cells")));
        }
        if !(params.resolution.is_finite() && params.resolution > 0.0) {
            return Err(GridMapError::corrupt(format!(
                "resolution {}",
                params.resolution
            )));
        }
        let (x, y) = params.position;
        if !(params.length.is_finite() && x.is_finite() && y.is_finite()) {
            return Err(GridMapError::corrupt("non-finite length or position"));
        }
        if self.mean_z.size() != size {
            return Err(GridMapError::corrupt(format!(
                "layer side {} but map side {size}",
                self.mean_z.size()
            )));
        }
        self.mean_z.validate()?;
        if self.start.row >= size || self.start.col >= size {
            return Err(GridMapError::corrupt(format!(
                "start index ({}, {}) outside a side of {size}",
                self.start.row, self.start.col
            )));
        }
        Ok(())
    }

    /// Reset every cell to `NaN`
    pub fn clear(&mut self) {
        self.mean_z.fill(f32::NAN);
    }
}

/// Logical indices along one axis that become new after a shift
fn scrolled_in(shift: i64, size: usize) -> std::ops::Range<usize> {
    let magnitude = shift.unsigned_abs() as usize;
    if magnitude >= size {
        0..size
    } else if shift > 0 {
        0..magnitude
    } else {
        size - magnitude..size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_4x4() -> GridMap {
        GridMap::new(MapParameters::new(4.0, 4.0, 1.0).unwrap())
    }

    #[test]
    fn test_new_map_is_unobserved() {
        let map = map_4x4();
        assert_eq!(map.size(), 4);
        assert_eq!(map.mean_z().observed_count(), 0);
        assert_eq!(map.start_index(), Index::default());
    }

    #[test]
    fn test_index_at_convention() {
        let map = map_4x4();
        // top-left: largest x and y
        assert_eq!(map.index_at(1.5, 1.5), Some(Index::new(0, 0)));
        assert_eq!(map.index_at(-1.5, 1.5), Some(Index::new(3, 0)));
        assert_eq!(map.index_at(1.5, -1.5), Some(Index::new(0, 3)));
        assert_eq!(map.index_at(2.5, 0.0), None);
        assert_eq!(map.index_at(0.0, -2.0), None);
    }

    #[test]
    fn test_position_at_is_cell_centre() {
        let map = map_4x4();
        assert_eq!(map.position_at(Index::new(0, 0)), (1.5, 1.5));
        assert_eq!(map.position_at(Index::new(3, 2)), (-1.5, -0.5));
    }

    #[test]
    fn test_point_from_index_keeps_nan() {
        let mut map = map_4x4();
        map.mean_z_mut().set(Index::new(1, 1), 0.25);

        let point = map.point_from_index(Index::new(1, 1), map.mean_z());
        assert_eq!(point, [0.5, 0.5, 0.25]);

        let missing = map.point_from_index(Index::new(0, 0), map.mean_z());
        assert!(missing[2].is_nan());
    }

    #[test]
    fn test_move_keeps_memory_and_clears_new_rows() {
        let mut map = map_4x4();
        assert!(map.set_elevation_at(1.5, 1.5, 1.0));
        assert!(map.set_elevation_at(-1.5, -1.5, 2.0));
        let slot_before = map.index_at(1.5, 1.5).unwrap();

        assert_eq!(map.move_to(1.0, 0.0), (1, 0));

        assert_eq!(map.parameters().position, (1.0, 0.0));
        assert_eq!(map.start_index(), Index::new(3, 0));
        assert_eq!(map.index_at(1.5, 1.5), Some(slot_before));
        assert_eq!(map.elevation_at(1.5, 1.5), Some(1.0));
        assert_eq!(map.unwrapped_index(slot_before), Index::new(1, 0));
        assert_eq!(map.elevation_at(-1.5, -1.5), None);
        assert_eq!(map.mean_z().observed_count(), 1);
        assert!(map.elevation_at(2.5, 1.5).unwrap().is_nan());
    }

    #[test]
    fn test_move_negative_columns() {
        let mut map = map_4x4();
        assert!(map.set_elevation_at(0.5, -1.5, 3.0));
        assert!(map.set_elevation_at(0.5, 1.5, 4.0));

        assert_eq!(map.move_to(0.0, -1.0), (0, -1));

        assert_eq!(map.elevation_at(0.5, -1.5), Some(3.0));
        assert_eq!(map.elevation_at(0.5, 1.5), None);
        assert!(map.elevation_at(0.5, -2.5).unwrap().is_nan());
        assert_eq!(map.mean_z().observed_count(), 1);
    }

    #[test]
    fn test_large_move_clears_everything() {
        let mut map = map_4x4();
        for cell in map.iter().collect::<Vec<_>>() {
            map.mean_z_mut().set(cell.index, 1.0);
        }
        map.move_to(10.0, 10.0);
        assert_eq!(map.mean_z().observed_count(), 0);
        assert_eq!(map.parameters().position, (10.0, 10.0));
    }

    #[test]
    fn test_validate_accepts_moved_map() {
        let mut map = map_4x4();
        map.move_to(-2.0, 3.0);
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_mismatched_parts() {
        let mut short_layer = map_4x4();
        short_layer.mean_z = Layer::filled(1, 1.0);
        assert!(matches!(
            short_layer.validate(),
            Err(GridMapError::Corrupt { .. })
        ));

        let mut bad_start = map_4x4();
        bad_start.start = Index::new(4, 0);
        assert!(bad_start.validate().is_err());

        let mut empty = map_4x4();
        empty.params.size = 0;
        empty.mean_z = Layer::filled(0, 0.0);
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_sub_cell_move_is_noop() {
        let mut map = map_4x4();
        map.set_elevation_at(0.5, 0.5, 1.0);
        assert_eq!(map.move_to(0.4, -0.4), (0, 0));
        assert_eq!(map.parameters().position, (0.0, 0.0));
        assert_eq!(map.mean_z().observed_count(), 1);
    }
}
