//! # Engine Mock
//!
//! Stand-in mapping engine for running the ingestion task without the SLAM
//! backend. It records every call, fuses cloud elevations into its maps with
//! a running blend, and supports injected failures, delays and a hold gate
//! for concurrency tests.

mod gate;
mod mock;

pub use gate::UpdateGate;
pub use mock::{EngineCalls, MockEngine, MockEngineConfig, UpdateRecord};
