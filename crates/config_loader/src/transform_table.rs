//! TransformTable - static transforms from the `[[transforms]]` section

use std::collections::HashMap;

use contracts::{ContractError, Pose, StaticTransformConfig, Timestamp, TransformService};
use tracing::debug;

/// [`TransformService`] answering from configured static transforms.
///
/// Each entry `source -> target` also answers `target -> source` with the
/// inverse pose. The lookup time is ignored.
#[derive(Debug, Clone, Default)]
pub struct TransformTable {
    edges: HashMap<(String, String), Pose>,
}

impl TransformTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(entries: &[StaticTransformConfig]) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.insert(&entry.source, &entry.target, entry.to_pose());
        }
        table
    }

    /// Add or replace the pose of `source` expressed in `target`
    pub fn insert(&mut self, source: &str, target: &str, pose: Pose) {
        self.edges
            .insert((source.to_string(), target.to_string()), pose);
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Configured pairs as `(source, target)`
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.keys().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    fn get(&self, source: &str, target: &str) -> Option<&Pose> {
        self.edges.get(&(source.to_string(), target.to_string()))
    }
}

impl TransformService for TransformTable {
    fn lookup(&self, source: &str, target: &str, _at: Timestamp) -> Result<Pose, ContractError> {
        if source == target {
            return Ok(Pose::identity());
        }
        if let Some(pose) = self.get(source, target) {
            return Ok(*pose);
        }
        if let Some(pose) = self.get(target, source) {
            debug!(source, target, "transform served from inverse entry");
            return Ok(pose.inverse());
        }
        Err(ContractError::transform_not_found(source, target))
    }
}
