//! Pose - rigid transform between two frames

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Rigid transform (translation + orientation), exchanged by copy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pose(Isometry3<f64>);

impl Pose {
    #[inline]
    pub fn identity() -> Self {
        Self(Isometry3::identity())
    }

    #[inline]
    pub fn new(isometry: Isometry3<f64>) -> Self {
        Self(isometry)
    }

    /// From a translation and roll/pitch/yaw in radians
    pub fn from_xyz_rpy(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self(Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        ))
    }

    #[inline]
    pub fn isometry(&self) -> &Isometry3<f64> {
        &self.0
    }

    #[inline]
    pub fn translation(&self) -> Vector3<f64> {
        self.0.translation.vector
    }

    /// Heading around z in radians
    pub fn yaw(&self) -> f64 {
        self.0.rotation.euler_angles().2
    }

    #[inline]
    pub fn inverse(&self) -> Self {
        Self(self.0.inverse())
    }

    /// `self * other`: apply `other` first, then `self`
    #[inline]
    pub fn compose(&self, other: &Pose) -> Self {
        Self(self.0 * other.0)
    }

    /// Transform a point expressed in the source frame into the target frame
    pub fn transform_point(&self, point: [f64; 3]) -> [f64; 3] {
        let p = self.0 * Point3::new(point[0], point[1], point[2]);
        [p.x, p.y, p.z]
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Timestamped pose between two named frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    pub time: Timestamp,
    pub source_frame: String,
    pub target_frame: String,
    pub pose: Pose,
}

impl PoseSample {
    pub fn new(
        time: Timestamp,
        source_frame: impl Into<String>,
        target_frame: impl Into<String>,
        pose: Pose,
    ) -> Self {
        Self {
            time,
            source_frame: source_frame.into(),
            target_frame: target_frame.into(),
            pose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_compose_and_inverse() {
        let a = Pose::from_xyz_rpy(1.0, 2.0, 3.0, 0.0, 0.0, FRAC_PI_2);
        let round = a.compose(&a.inverse());
        let t = round.translation();
        assert!(t.norm() < 1e-12);
    }

    #[test]
    fn test_transform_point_with_yaw() {
        let pose = Pose::from_xyz_rpy(1.0, 0.0, 0.0, 0.0, 0.0, FRAC_PI_2);
        let p = pose.transform_point([1.0, 0.0, 0.0]);
        assert!((p[0] - 1.0).abs() < 1e-12);
        assert!((p[1] - 1.0).abs() < 1e-12);
        assert!((pose.yaw() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_json_round_trip() {
        let pose = Pose::from_xyz_rpy(0.5, -0.5, 0.1, 0.0, 0.1, 0.2);
        let json = serde_json::to_string(&pose).unwrap();
        let back: Pose = serde_json::from_str(&json).unwrap();
        assert!((back.translation() - pose.translation()).norm() < 1e-12);
    }
}
