//! Error types for CLI operations.

use debug_export::ExportError;
use dispatcher::TaskError;
use ingestion::IngestionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// The ingest task refused to configure
    #[error("Failed to configure ingest task: {0}")]
    Configure(#[from] TaskError),

    /// A mock sensor source could not start
    #[error("Failed to start sensor source: {0}")]
    Source(#[from] IngestionError),

    /// An export backend could not be created
    #[error("Failed to create export backend: {0}")]
    ExportBackend(#[from] ExportError),

    /// Metrics endpoint could not be installed
    #[error("Failed to initialize metrics: {message}")]
    Metrics { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn metrics(message: impl Into<String>) -> Self {
        Self::Metrics {
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
