//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::TransformTable;
use contracts::{TaskConfig, Timestamp, TransformService};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    map_cells: usize,
    period_ms: u64,
    transform_count: usize,
    debug_exports: Vec<&'static str>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(summarize(&config)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn summarize(config: &TaskConfig) -> ConfigSummary {
    let debug = &config.debug;
    let debug_exports = [
        (debug.raw_map, "raw_map"),
        (debug.cloud, "cloud"),
        (debug.serialization, "serialization"),
    ]
    .into_iter()
    .filter(|(on, _)| debug.debug_info && *on)
    .map(|(_, name)| name)
    .collect();

    ConfigSummary {
        version: format!("{:?}", config.version),
        map_cells: config
            .engine
            .map_parameters()
            .map(|p| p.cell_count())
            .unwrap_or(0),
        period_ms: config.cycle.period_ms,
        transform_count: config.transforms.len(),
        debug_exports,
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &TaskConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    // `run` resolves static transforms from the table only
    let table = TransformTable::from_config(&config.transforms);
    let frames = &config.frames;
    for (source, target) in [
        (&frames.body, &frames.ground),
        (&frames.hazcam, &frames.body),
        (&frames.loccam, &frames.body),
    ] {
        if table.lookup(source, target, Timestamp::now()).is_err() {
            warnings.push(format!(
                "No static transform {source} -> {target} in [[transforms]] - `run` will refuse to start"
            ));
        }
    }

    let debug = &config.debug;
    if !debug.debug_info && (debug.raw_map || debug.cloud || debug.serialization) {
        warnings.push("debug.debug_info is off - other debug toggles are ignored".to_string());
    }
    if debug.serialization && debug.local_map_path == debug.global_map_path {
        warnings.push(format!(
            "debug.local_map_path and debug.global_map_path are both '{}' - the global map overwrites the local one",
            debug.local_map_path
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Map cells: {}", summary.map_cells);
            println!("  Cycle period: {} ms", summary.period_ms);
            println!("  Static transforms: {}", summary.transform_count);
            if summary.debug_exports.is_empty() {
                println!("  Debug exports: none");
            } else {
                println!("  Debug exports: {}", summary.debug_exports.join(", "));
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{StaticTransformConfig, Transform};

    fn edge(source: &str, target: &str) -> StaticTransformConfig {
        StaticTransformConfig {
            source: source.into(),
            target: target.into(),
            transform: Transform::default(),
        }
    }

    #[test]
    fn test_missing_transforms_warned() {
        let mut config = TaskConfig::default();
        config.transforms.push(edge("ground", "body"));

        let warnings = collect_warnings(&config);
        // body -> ground is served by the inverse entry
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("hazcam -> body"));
        assert!(warnings[1].contains("loccam -> body"));
    }

    #[test]
    fn test_ignored_toggles_warned() {
        let mut config = TaskConfig::default();
        for (s, t) in [("body", "ground"), ("hazcam", "body"), ("loccam", "body")] {
            config.transforms.push(edge(s, t));
        }
        config.debug.cloud = true;

        let warnings = collect_warnings(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("debug_info is off"));
        assert!(summarize(&config).debug_exports.is_empty());
    }

    #[test]
    fn test_summary_counts_cells() {
        let mut config = TaskConfig::default();
        config.engine.map_length_x = 4.0;
        config.engine.map_length_y = 4.0;
        config.engine.map_resolution = 1.0;
        config.debug.debug_info = true;
        config.debug.raw_map = true;

        let summary = summarize(&config);
        assert_eq!(summary.map_cells, 16);
        assert_eq!(summary.debug_exports, vec!["raw_map"]);
    }
}
