//! Ingestion error types

use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Mock source frequency must be positive and finite
    #[error("invalid frequency for source {source_name}: {frequency_hz} Hz")]
    InvalidFrequency {
        source_name: String,
        frequency_hz: f64,
    },

    /// Source was started twice
    #[error("source {source_name} is already running")]
    AlreadyRunning { source_name: String },

    /// `start` was called outside a Tokio runtime
    #[error("no tokio runtime available to start source {source_name}")]
    NoRuntime { source_name: String },
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
