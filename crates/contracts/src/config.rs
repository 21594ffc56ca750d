//! TaskConfig - Config Loader output
//!
//! Describes the ingestion task: engine parameters, frame names, static
//! transforms, debug toggles and the cycle period.

use serde::{Deserialize, Serialize};

use grid_map::{GridMapError, MapParameters};

use crate::Pose;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete task configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Engine parameters, applied once at configure time
    #[serde(default)]
    pub engine: EngineParameters,

    /// Frame names used for transform lookups
    #[serde(default)]
    pub frames: FrameConfig,

    /// Debug/export toggles and paths
    #[serde(default)]
    pub debug: DebugConfig,

    /// Periodic driver settings
    #[serde(default)]
    pub cycle: CycleConfig,

    /// Static transforms served by the transform table
    #[serde(default)]
    pub transforms: Vec<StaticTransformConfig>,
}

/// Engine scalars passed to `set_parameters`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParameters {
    /// Map extent along x (meters)
    pub map_length_x: f64,
    /// Map extent along y (meters)
    pub map_length_y: f64,
    /// Cell side (meters)
    pub map_resolution: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
    /// Downsampling voxel side (meters)
    pub voxel_size: f64,
    pub num_particles: usize,
    /// Resample every N predictions
    pub resample_frequency: usize,
    pub initial_sigma_x: f64,
    pub initial_sigma_y: f64,
    pub initial_sigma_yaw: f64,
    pub predict_sigma_x: f64,
    pub predict_sigma_y: f64,
    pub predict_sigma_yaw: f64,
    pub traversed_distance_threshold: f64,
    pub slope_sum_threshold: f64,
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self {
            map_length_x: 12.0,
            map_length_y: 12.0,
            map_resolution: 0.05,
            min_elevation: -1.0,
            max_elevation: 1.0,
            voxel_size: 0.04,
            num_particles: 100,
            resample_frequency: 5,
            initial_sigma_x: 0.0,
            initial_sigma_y: 0.0,
            initial_sigma_yaw: 0.0,
            predict_sigma_x: 0.05,
            predict_sigma_y: 0.05,
            predict_sigma_yaw: 0.005,
            traversed_distance_threshold: 5.0,
            slope_sum_threshold: 10.0,
        }
    }
}

impl EngineParameters {
    /// Grid geometry implied by the map lengths and resolution
    pub fn map_parameters(&self) -> Result<MapParameters, GridMapError> {
        MapParameters::new(self.map_length_x, self.map_length_y, self.map_resolution)
    }
}

/// Frame names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub body: String,
    pub ground: String,
    pub hazcam: String,
    pub loccam: String,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            body: "body".to_string(),
            ground: "ground".to_string(),
            hazcam: "hazcam".to_string(),
            loccam: "loccam".to_string(),
        }
    }
}

/// Debug/export configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Master toggle for the export step
    pub debug_info: bool,
    /// Raw-map image export
    pub raw_map: bool,
    /// Map cloud export
    pub cloud: bool,
    /// Pose and map persistence
    pub serialization: bool,
    pub pose_path: String,
    pub local_map_path: String,
    pub global_map_path: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            debug_info: false,
            raw_map: false,
            cloud: false,
            serialization: false,
            pose_path: "pose.json".to_string(),
            local_map_path: "local_map.bin".to_string(),
            global_map_path: "global_map.bin".to_string(),
        }
    }
}

/// Periodic driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Cycle period in milliseconds, must be > 0
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

fn default_period_ms() -> u64 {
    100
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
        }
    }
}

/// One static transform: pose of `source` expressed in `target`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticTransformConfig {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub transform: Transform,
}

impl StaticTransformConfig {
    pub fn to_pose(&self) -> Pose {
        self.transform.to_pose()
    }
}

/// 3D transform: location + rotation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Location (x, y, z) in meters
    #[serde(default)]
    pub location: Location,

    /// Rotation (roll, pitch, yaw) in degrees
    #[serde(default)]
    pub rotation: Rotation,
}

impl Transform {
    pub fn to_pose(&self) -> Pose {
        let Location { x, y, z } = self.location;
        let Rotation { roll, pitch, yaw } = self.rotation;
        Pose::from_xyz_rpy(x, y, z, roll.to_radians(), pitch.to_radians(), yaw.to_radians())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: TaskConfig = serde_json::from_str(r#"{"cycle": {}}"#).unwrap();
        assert_eq!(config.version, ConfigVersion::V1);
        assert_eq!(config.cycle.period_ms, 100);
        assert!(!config.debug.debug_info);
        assert_eq!(config.frames.body, "body");
        assert!(config.transforms.is_empty());
    }

    #[test]
    fn test_map_parameters_from_engine() {
        let engine = EngineParameters {
            map_length_x: 4.0,
            map_length_y: 4.0,
            map_resolution: 1.0,
            ..Default::default()
        };
        let params = engine.map_parameters().unwrap();
        assert_eq!(params.size, 4);
    }

    #[test]
    fn test_transform_rotation_in_degrees() {
        let transform = Transform {
            location: Location {
                x: 1.0,
                y: 2.0,
                z: 3.0,
            },
            rotation: Rotation {
                roll: 0.0,
                pitch: 0.0,
                yaw: 90.0,
            },
        };
        let pose = transform.to_pose();
        assert!((pose.yaw() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
        assert!((pose.translation().z - 3.0).abs() < 1e-12);
    }
}
