//! # Config Loader
//!
//! Loads the ingestion task configuration.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Build the static [`TransformTable`] from `[[transforms]]`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::{ConfigLoader, TransformTable};
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("task.toml")).unwrap();
//! let transforms = TransformTable::from_config(&config.transforms);
//! println!("period: {} ms, {} transforms", config.cycle.period_ms, transforms.len());
//! ```

mod parser;
mod transform_table;
mod validator;

pub use contracts::TaskConfig;
pub use parser::ConfigFormat;
pub use transform_table::TransformTable;

use contracts::ContractError;
use std::path::Path;
use tracing::{debug, instrument};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file path.
    ///
    /// The format is detected from the extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    #[instrument(name = "config_load", fields(path = %path.display()))]
    pub fn load_from_path(path: &Path) -> Result<TaskConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        let config = Self::load_from_str(&content, format)?;
        debug!(
            ?format,
            transforms = config.transforms.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<TaskConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Run validation on an already built configuration
    pub fn validate(config: &TaskConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    pub fn to_toml(config: &TaskConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    pub fn to_json(config: &TaskConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}
