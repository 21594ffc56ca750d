//! # Debug Export
//!
//! Best-effort snapshots of the engine state, taken once per cycle when the
//! `debug_info` toggle is on:
//!
//! - raw-map image -> image output port
//! - raw-map cloud -> cloud output port
//! - pose, local map and global map -> snapshot writer
//!
//! Each export is toggled on its own and fails on its own: one failed write
//! never stops the others, and nothing here returns an error to the cycle.

mod error;
mod exporter;
mod report;
mod sinks;
mod snapshot;
pub mod stats;

pub use error::ExportError;
pub use exporter::DebugExporter;
pub use report::{Export, ExportOutcome, ExportReport};
pub use sinks::{FileCloudPort, FileImagePort, LogPort};
pub use snapshot::{load_grid_map, load_pose, FileSnapshotWriter};
pub use stats::{ExportMetrics, ExportMetricsSnapshot};
