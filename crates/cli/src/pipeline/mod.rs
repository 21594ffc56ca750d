//! Pipeline orchestration module.

mod exporter;
mod orchestrator;
mod sources;
mod stats;

pub use orchestrator::{Pipeline, PipelineConfig};
pub use sources::MockSettings;
pub use stats::{PipelineStats, StopReason};
