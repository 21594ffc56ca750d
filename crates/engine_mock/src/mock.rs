//! Mock mapping engine

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use contracts::{
    ContractError, EngineParameters, GridMap, Guarded, MappingEngine, NativeCloud, Pose,
    SharedMap, SharedPose,
};
use tracing::{debug, instrument};

use crate::UpdateGate;

/// Mock engine configuration (failure injection)
#[derive(Debug, Clone, Default)]
pub struct MockEngineConfig {
    /// Reject `set_parameters`
    pub fail_parameters: bool,
    /// Reject every `update_from_cloud`
    pub fail_updates: bool,
    /// Reject every `register_prior_cloud`
    pub fail_priors: bool,
    /// Sleep inside each cloud update
    pub update_delay: Option<Duration>,
}

/// One recorded cloud update
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRecord {
    pub stamp_us: u64,
    pub points: usize,
    pub sensor_to_body: Pose,
}

/// Call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineCalls {
    pub set_parameters: u64,
    pub predict: u64,
    pub update_from_cloud: u64,
    pub register_prior_cloud: u64,
}

#[derive(Debug, Default)]
struct CallCounters {
    set_parameters: AtomicU64,
    predict: AtomicU64,
    update_from_cloud: AtomicU64,
    register_prior_cloud: AtomicU64,
}

/// Mock engine
///
/// Cloud points are taken to the world frame through the current pose and
/// the sensor transform, then blended into the raw map. Prior clouds are
/// already in the world frame and land in the global map.
pub struct MockEngine {
    config: MockEngineConfig,
    gate: UpdateGate,
    raw_map: SharedMap,
    global_map: SharedMap,
    pose: SharedPose,
    parameters: Guarded<Option<EngineParameters>>,
    updates: Guarded<Vec<UpdateRecord>>,
    calls: CallCounters,
    active_updates: AtomicUsize,
    max_active_updates: AtomicUsize,
}

impl MockEngine {
    /// Create default mock engine
    pub fn new() -> Self {
        Self::with_config(MockEngineConfig::default())
    }

    /// Create mock engine with config. Maps use the default engine geometry
    /// until `set_parameters` is called.
    pub fn with_config(config: MockEngineConfig) -> Self {
        let map = EngineParameters::default()
            .map_parameters()
            .map(GridMap::new)
            .unwrap_or_else(|_| GridMap::new(fallback_parameters()));

        Self {
            config,
            gate: UpdateGate::new(),
            raw_map: Guarded::new(map.clone()),
            global_map: Guarded::new(map),
            pose: Guarded::new(Pose::identity()),
            parameters: Guarded::default(),
            updates: Guarded::default(),
            calls: CallCounters::default(),
            active_updates: AtomicUsize::new(0),
            max_active_updates: AtomicUsize::new(0),
        }
    }

    /// Gate every cloud update passes before touching state
    pub fn gate(&self) -> &UpdateGate {
        &self.gate
    }

    /// Get call counters
    pub fn calls(&self) -> EngineCalls {
        EngineCalls {
            set_parameters: self.calls.set_parameters.load(Ordering::SeqCst),
            predict: self.calls.predict.load(Ordering::SeqCst),
            update_from_cloud: self.calls.update_from_cloud.load(Ordering::SeqCst),
            register_prior_cloud: self.calls.register_prior_cloud.load(Ordering::SeqCst),
        }
    }

    /// Recorded cloud updates, oldest first
    pub fn updates(&self) -> Vec<UpdateRecord> {
        self.updates.snapshot()
    }

    /// Parameters applied by the last `set_parameters`
    pub fn parameters(&self) -> Option<EngineParameters> {
        self.parameters.snapshot()
    }

    /// Highest number of cloud updates seen running at once
    pub fn max_concurrent_updates(&self) -> usize {
        self.max_active_updates.load(Ordering::SeqCst)
    }

    fn enter_update(&self) {
        let active = self.active_updates.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_updates.fetch_max(active, Ordering::SeqCst);
    }

    fn leave_update(&self) {
        self.active_updates.fetch_sub(1, Ordering::SeqCst);
    }

    fn fuse_cloud(&self, cloud: &NativeCloud, sensor_to_world: Option<Pose>) -> usize {
        let mut fused = 0;
        let target = if sensor_to_world.is_some() {
            &self.raw_map
        } else {
            &self.global_map
        };

        target.write(|map| {
            for p in &cloud.points {
                let local = [f64::from(p.x), f64::from(p.y), f64::from(p.z)];
                if !local.iter().all(|v| v.is_finite()) {
                    continue;
                }
                let [x, y, z] = match sensor_to_world {
                    Some(pose) => pose.transform_point(local),
                    None => local,
                };
                let blended = match map.elevation_at(x, y) {
                    Some(old) if !old.is_nan() => (old + z as f32) / 2.0,
                    _ => z as f32,
                };
                if map.set_elevation_at(x, y, blended) {
                    fused += 1;
                }
            }
            map.set_timestamp(map.timestamp().max(cloud.stamp_us));
        });
        fused
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingEngine for MockEngine {
    #[instrument(name = "mock_engine_set_parameters", skip_all)]
    fn set_parameters(&self, params: &EngineParameters) -> Result<(), ContractError> {
        self.calls.set_parameters.fetch_add(1, Ordering::SeqCst);
        if self.config.fail_parameters {
            return Err(ContractError::engine("set_parameters", "mock failure injected"));
        }

        let geometry = params.map_parameters()?;
        self.raw_map.replace(GridMap::new(geometry));
        self.global_map.replace(GridMap::new(geometry));
        self.parameters.replace(Some(params.clone()));

        debug!(size = geometry.size, resolution = geometry.resolution, "mock engine configured");
        Ok(())
    }

    fn predict(&self, pose_guess: Pose, body_to_ground: Pose) -> Result<(), ContractError> {
        self.calls.predict.fetch_add(1, Ordering::SeqCst);

        let estimate = pose_guess.compose(&body_to_ground);
        self.pose.replace(estimate);

        let t = estimate.translation();
        self.raw_map.write(|map| map.move_to(t.x, t.y));
        Ok(())
    }

    fn update_from_cloud(
        &self,
        cloud: NativeCloud,
        sensor_to_body: Pose,
    ) -> Result<(), ContractError> {
        self.calls.update_from_cloud.fetch_add(1, Ordering::SeqCst);
        self.enter_update();
        self.gate.pass();
        if let Some(delay) = self.config.update_delay {
            std::thread::sleep(delay);
        }

        let result = if self.config.fail_updates {
            Err(ContractError::engine("update_from_cloud", "mock failure injected"))
        } else {
            let sensor_to_world = self.pose.snapshot().compose(&sensor_to_body);
            let fused = self.fuse_cloud(&cloud, Some(sensor_to_world));
            self.updates.write(|log| {
                log.push(UpdateRecord {
                    stamp_us: cloud.stamp_us,
                    points: cloud.len(),
                    sensor_to_body,
                })
            });
            debug!(points = cloud.len(), fused, "mock cloud update");
            Ok(())
        };

        self.leave_update();
        result
    }

    fn register_prior_cloud(&self, cloud: NativeCloud) -> Result<(), ContractError> {
        self.calls.register_prior_cloud.fetch_add(1, Ordering::SeqCst);
        if self.config.fail_priors {
            return Err(ContractError::engine("register_prior_cloud", "mock failure injected"));
        }

        let fused = self.fuse_cloud(&cloud, None);
        debug!(points = cloud.len(), fused, "mock prior cloud registered");
        Ok(())
    }

    fn raw_map(&self) -> &SharedMap {
        &self.raw_map
    }

    fn global_map(&self) -> &SharedMap {
        &self.global_map
    }

    fn pose(&self) -> Pose {
        self.pose.snapshot()
    }
}

fn fallback_parameters() -> contracts::MapParameters {
    contracts::MapParameters {
        length: 1.0,
        resolution: 1.0,
        size: 1,
        position: (0.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::NativePoint;

    fn small_params() -> EngineParameters {
        EngineParameters {
            map_length_x: 4.0,
            map_length_y: 4.0,
            map_resolution: 1.0,
            ..Default::default()
        }
    }

    fn cloud(stamp_us: u64, points: &[(f32, f32, f32)]) -> NativeCloud {
        NativeCloud {
            stamp_us,
            is_dense: true,
            points: points
                .iter()
                .map(|&(x, y, z)| NativePoint::new(x, y, z))
                .collect(),
        }
    }

    #[test]
    fn test_set_parameters_resizes_maps() {
        let engine = MockEngine::new();
        engine.set_parameters(&small_params()).unwrap();

        assert_eq!(engine.raw_map().read(|m| m.size()), 4);
        assert_eq!(engine.global_map().read(|m| m.size()), 4);
        assert_eq!(engine.parameters(), Some(small_params()));
        assert_eq!(engine.calls().set_parameters, 1);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let engine = MockEngine::new();
        let params = EngineParameters {
            map_resolution: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            engine.set_parameters(&params),
            Err(ContractError::GridMap(_))
        ));
    }

    #[test]
    fn test_oversized_map_rejected_before_allocation() {
        let engine = MockEngine::new();
        engine.set_parameters(&small_params()).unwrap();
        let params = EngineParameters {
            map_resolution: 1e-4,
            ..small_params()
        };
        assert!(matches!(
            engine.set_parameters(&params),
            Err(ContractError::GridMap(contracts::GridMapError::TooLarge { .. }))
        ));
        assert_eq!(engine.raw_map().read(|m| m.size()), 4);
    }

    #[test]
    fn test_update_fuses_into_raw_map() {
        let engine = MockEngine::new();
        engine.set_parameters(&small_params()).unwrap();

        let sensor_to_body = Pose::from_xyz_rpy(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        engine
            .update_from_cloud(cloud(500, &[(0.5, 0.5, 2.0)]), sensor_to_body)
            .unwrap();

        let map = engine.raw_map().snapshot();
        assert_eq!(map.elevation_at(1.5, 0.5), Some(2.0));
        assert_eq!(map.timestamp(), 500);
        assert_eq!(engine.global_map().read(|m| m.mean_z().observed_count()), 0);

        let updates = engine.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].sensor_to_body, sensor_to_body);
    }

    #[test]
    fn test_repeated_samples_blend() {
        let engine = MockEngine::new();
        engine.set_parameters(&small_params()).unwrap();

        engine
            .update_from_cloud(cloud(1, &[(0.5, 0.5, 1.0)]), Pose::identity())
            .unwrap();
        engine
            .update_from_cloud(cloud(2, &[(0.5, 0.5, 3.0)]), Pose::identity())
            .unwrap();
        assert_eq!(engine.raw_map().read(|m| m.elevation_at(0.5, 0.5)), Some(2.0));
    }

    #[test]
    fn test_prior_cloud_lands_in_global_map() {
        let engine = MockEngine::new();
        engine.set_parameters(&small_params()).unwrap();

        engine
            .register_prior_cloud(cloud(7, &[(-1.5, -1.5, 0.5), (f32::NAN, 0.0, 0.0)]))
            .unwrap();

        let global = engine.global_map().snapshot();
        assert_eq!(global.mean_z().observed_count(), 1);
        assert_eq!(global.elevation_at(-1.5, -1.5), Some(0.5));
        assert_eq!(engine.raw_map().read(|m| m.mean_z().observed_count()), 0);
    }

    #[test]
    fn test_predict_moves_pose_and_map() {
        let engine = MockEngine::new();
        engine.set_parameters(&small_params()).unwrap();

        let guess = Pose::from_xyz_rpy(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        engine.predict(guess, Pose::identity()).unwrap();

        assert_eq!(engine.pose(), guess);
        assert_eq!(engine.raw_map().read(|m| m.parameters().position), (1.0, 0.0));
        assert_eq!(engine.calls().predict, 1);
    }

    #[test]
    fn test_injected_failures() {
        let engine = MockEngine::with_config(MockEngineConfig {
            fail_updates: true,
            fail_priors: true,
            ..Default::default()
        });

        assert!(engine
            .update_from_cloud(cloud(1, &[(0.0, 0.0, 0.0)]), Pose::identity())
            .is_err());
        assert!(engine.register_prior_cloud(cloud(1, &[])).is_err());
        assert!(engine.updates().is_empty());
        assert_eq!(engine.calls().update_from_cloud, 1);
    }
}
