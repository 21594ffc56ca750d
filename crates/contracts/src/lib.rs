//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate (and the grid map it
//! re-exports), reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Generic samples carry a signed microsecond [`Timestamp`]
//! - The engine's native clouds and grid maps carry unsigned microseconds
//!
//! ## Collaborators
//! - [`MappingEngine`]: the opaque SLAM engine
//! - [`TransformService`]: frame lookups at startup
//! - [`SampleInput`] / [`OutputPort`]: sample ports in and out
//! - [`SnapshotWriter`]: persistence backend

mod channel;
mod cloud;
mod config;
mod engine;
mod error;
mod image;
mod port;
mod pose;
mod shared;
mod snapshot;
mod time;
mod transform;

pub use channel::Channel;
pub use cloud::*;
pub use config::*;
pub use engine::MappingEngine;
pub use error::*;
pub use image::GenericImage;
pub use port::{OutputPort, SampleInput};
pub use pose::{Pose, PoseSample};
pub use shared::{Guarded, SharedMap, SharedPose};
pub use snapshot::SnapshotWriter;
pub use time::Timestamp;
pub use transform::TransformService;

pub use grid_map::{GridMap, GridMapError, Index, MapParameters};
