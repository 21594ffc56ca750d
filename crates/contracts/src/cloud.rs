//! Point clouds - generic exchange form and engine native form

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Generic 3D point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GenericPoint {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Generic ordered point cloud
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericCloud {
    /// Capture time
    pub time: Timestamp,

    /// Points, order is significant
    pub points: Vec<GenericPoint>,
}

impl GenericCloud {
    pub fn new(time: Timestamp, points: Vec<GenericPoint>) -> Self {
        Self { time, points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Engine native point (single precision)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NativePoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl NativePoint {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Engine native point cloud
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeCloud {
    /// Capture time in microseconds
    pub stamp_us: u64,

    /// `true` when every point is finite
    pub is_dense: bool,

    pub points: Vec<NativePoint>,
}

impl NativeCloud {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
