//! Ingest task error types

use contracts::ContractError;
use thiserror::Error;

/// Errors that abort task configuration. Nothing raised after a successful
/// `configure` is fatal.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A static transform could not be resolved
    #[error("static transform not found: {source_frame} -> {target_frame}")]
    TransformNotFound {
        source_frame: String,
        target_frame: String,
    },

    /// Configuration rejected before reaching the engine
    #[error("invalid task config at '{field}': {message}")]
    Config { field: String, message: String },

    /// Engine rejected its parameters
    #[error("engine rejected parameters: {0}")]
    Engine(#[source] ContractError),

    /// No Tokio runtime to run channel workers on
    #[error("no tokio runtime available for channel workers")]
    NoRuntime,
}

impl TaskError {
    pub fn transform_not_found(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::TransformNotFound {
            source_frame: source.into(),
            target_frame: target.into(),
        }
    }

    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }
}
