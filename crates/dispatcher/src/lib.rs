//! # Dispatcher
//!
//! Per-channel, non-blocking dispatch of sensor samples into the mapping
//! engine.
//!
//! Each cycle polls every channel: a channel whose previous worker is still
//! running is skipped and drops whatever arrived meanwhile; an idle channel
//! with new data launches exactly one worker (conversion plus a single engine
//! call). Channels never wait on each other, and within a channel workers
//! never overlap.

pub mod error;
mod inputs;
mod slot;
pub mod stats;
mod task;

pub use error::TaskError;
pub use inputs::{StaticTransforms, TaskInputs};
pub use slot::{ChannelSlot, Job};
pub use stats::{ChannelMetrics, ChannelMetricsSnapshot};
pub use task::{ChannelPoll, CycleReport, IngestTask, IngestTaskBuilder};
