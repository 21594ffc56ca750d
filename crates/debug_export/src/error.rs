//! Debug export error types

use std::path::{Path, PathBuf};

use contracts::{ContractError, GridMapError};
use thiserror::Error;

/// Errors raised by the file backends
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem error
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// PNG encoding error
    #[error("image encoding failed for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// JSON/bincode encoding or decoding error
    #[error("serialization failed for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Snapshot decoded but does not describe a usable map
    #[error("corrupt grid map in {path}: {source}")]
    CorruptMap {
        path: PathBuf,
        #[source]
        source: GridMapError,
    },

    /// Image buffer does not match its declared size
    #[error("image is {width}x{height} but holds {len} samples")]
    ImageShape {
        width: usize,
        height: usize,
        len: usize,
    },
}

impl ExportError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn encode(path: &Path, message: impl ToString) -> Self {
        Self::Encode {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

impl From<ExportError> for ContractError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Encode { path, message } => {
                ContractError::serialization(path.display().to_string(), message)
            }
            other => ContractError::Other(other.to_string()),
        }
    }
}
