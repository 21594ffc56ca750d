//! # Converters
//!
//! Pure conversions between the generic exchange types and the engine's
//! native cloud and grid map.
//!
//! Every function carries the timestamp across and never filters samples:
//! `NaN` points and cells pass through unchanged.

mod cloud;
mod map;

pub use cloud::{cloud_to_native, native_to_cloud};
pub use map::{map_to_cloud, map_to_image};
