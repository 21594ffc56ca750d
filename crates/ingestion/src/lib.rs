//! # Ingestion
//!
//! Sensor sample ports feeding the periodic dispatch cycle.
//!
//! Responsibilities:
//! - Latest-value sample ports built on `tokio::sync::watch`
//! - Mock sensor sources for running without real drivers
//! - Per-port write/read counters
//!
//! ## Usage Example
//!
//! ```
//! use contracts::{GenericCloud, SampleInput};
//! use ingestion::sample_port;
//!
//! let (writer, mut port) = sample_port::<GenericCloud>("hazcam_cloud");
//! assert!(!port.has_new());
//!
//! writer.publish(GenericCloud::default());
//! assert!(port.read_new().is_some());
//! assert!(port.read_new().is_none());
//! ```
//!
//! ## Mock Sources
//!
//! ```ignore
//! use ingestion::{sample_port, MockSensorSource, terrain_cloud};
//!
//! let (writer, port) = sample_port("hazcam_cloud");
//! let source = MockSensorSource::new("hazcam", 10.0)?;
//! source.start(writer, terrain_cloud(500, 3.0))?;
//! ```

mod error;
mod mock;
mod port;
mod stats;

// Re-exports
pub use error::{IngestionError, Result};
pub use mock::{straight_line_pose, terrain_cloud, MockSensorSource};
pub use port::{sample_port, SamplePort, SampleWriter};
pub use stats::{PortMetrics, PortMetricsSnapshot};
