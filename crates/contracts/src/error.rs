//! Layered error definitions
//!
//! Categorized by source: config / transform / engine / port / persistence

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Transform Errors =====
    /// Transform service could not resolve a frame pair
    #[error("transform not found: {source_frame} -> {target_frame}")]
    TransformNotFound {
        source_frame: String,
        target_frame: String,
    },

    // ===== Engine Errors =====
    /// Engine rejected a call
    #[error("engine error in {operation}: {message}")]
    Engine { operation: String, message: String },

    /// Grid map geometry error
    #[error("grid map error: {0}")]
    GridMap(#[from] grid_map::GridMapError),

    // ===== Port Errors =====
    /// Output port write error
    #[error("port '{port}' write error: {message}")]
    PortWrite { port: String, message: String },

    // ===== Persistence Errors =====
    /// Snapshot serialization error
    #[error("serialization error for '{path}': {message}")]
    Serialization { path: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transform-not-found error
    pub fn transform_not_found(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::TransformNotFound {
            source_frame: source.into(),
            target_frame: target.into(),
        }
    }

    /// Create engine error
    pub fn engine(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Engine {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create port write error
    pub fn port_write(port: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PortWrite {
            port: port.into(),
            message: message.into(),
        }
    }

    /// Create serialization error
    pub fn serialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            path: path.into(),
            message: message.into(),
        }
    }
}
