//! SnapshotWriter trait - persistence backend for pose and maps

use std::path::Path;

use grid_map::GridMap;

use crate::{ContractError, Pose};

/// Writes state snapshots to a target path. The format belongs to the
/// backend.
pub trait SnapshotWriter: Send {
    fn save_pose(&mut self, pose: &Pose, path: &Path) -> Result<(), ContractError>;

    fn save_grid_map(&mut self, map: &GridMap, path: &Path) -> Result<(), ContractError>;
}
