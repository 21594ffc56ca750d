//! TransformService trait - frame lookups

use crate::{ContractError, Pose, Timestamp};

/// Resolves the pose of `source` expressed in `target`.
pub trait TransformService: Send + Sync {
    /// # Errors
    /// [`ContractError::TransformNotFound`] when the pair cannot be resolved
    fn lookup(&self, source: &str, target: &str, at: Timestamp) -> Result<Pose, ContractError>;
}
