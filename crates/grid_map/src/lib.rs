//! # Grid Map
//!
//! Rolling elevation grid used as the engine's raw and global map.
//!
//! The grid is a square circular buffer: every cell has a fixed storage slot
//! (the *wrapped* index) and a logical position relative to the map centre
//! (the *unwrapped* index). Re-centring the map only moves the buffer start
//! index, cell memory never moves.
//!
//! ## Conventions
//!
//! - Index `(0, 0)` unwrapped is the top-left cell: largest `x`, largest `y`.
//! - `x` decreases with row, `y` decreases with column.
//! - Storage is column-major, iteration follows storage order.
//! - Unobserved cells hold `NaN`.
//!
//! ```
//! use grid_map::{GridMap, MapParameters};
//!
//! let params = MapParameters::new(2.0, 2.0, 0.5).unwrap();
//! let mut map = GridMap::new(params);
//! assert_eq!(map.size(), 4);
//! assert!(map.set_elevation_at(0.1, 0.1, 1.5));
//! assert_eq!(map.elevation_at(0.1, 0.1), Some(1.5));
//! ```

mod error;
mod index;
mod iterator;
mod layer;
mod map;
mod parameters;

pub use error::GridMapError;
pub use index::{unwrap_index, wrap_index, Index};
pub use iterator::{GridCell, GridIterator};
pub use layer::Layer;
pub use map::GridMap;
pub use parameters::{MapParameters, MAX_CELLS_PER_SIDE};
