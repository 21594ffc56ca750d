//! MappingEngine trait - the opaque SLAM engine

use crate::{ContractError, EngineParameters, NativeCloud, Pose, SharedMap};

/// Capability interface of the mapping/localization engine.
///
/// Calls may arrive concurrently from different channel workers; the engine
/// serializes its own state mutations. The raw and global maps are exposed
/// behind independent locks for readers.
pub trait MappingEngine: Send + Sync + 'static {
    /// Apply configuration before any update
    fn set_parameters(&self, params: &EngineParameters) -> Result<(), ContractError>;

    /// Prediction step from a pose guess, expressed through `body_to_ground`
    fn predict(&self, pose_guess: Pose, body_to_ground: Pose) -> Result<(), ContractError>;

    /// Observation update from a sensor cloud
    fn update_from_cloud(
        &self,
        cloud: NativeCloud,
        sensor_to_body: Pose,
    ) -> Result<(), ContractError>;

    /// Register a prior (orbital) cloud against the global map
    fn register_prior_cloud(&self, cloud: NativeCloud) -> Result<(), ContractError>;

    /// Local map built from sensor updates
    fn raw_map(&self) -> &SharedMap;

    /// Global map built from prior clouds
    fn global_map(&self) -> &SharedMap;

    /// Current pose estimate
    fn pose(&self) -> Pose;
}
