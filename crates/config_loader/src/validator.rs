//! Config validation
//!
//! Rules:
//! - engine geometry yields a square grid with a positive resolution
//! - min_elevation < max_elevation
//! - sampling scalars are positive, sigmas are non-negative
//! - frame names are non-empty
//! - persistence paths are non-empty when serialization is on
//! - cycle.period_ms > 0
//! - static transforms name two distinct frames, each pair at most once

use std::collections::HashSet;

use contracts::{ContractError, TaskConfig};

/// Validate a parsed [`TaskConfig`]
///
/// Returns the first error encountered.
pub fn validate(config: &TaskConfig) -> Result<(), ContractError> {
    validate_engine(config)?;
    validate_frames(config)?;
    validate_debug(config)?;
    validate_cycle(config)?;
    validate_transforms(config)?;
    Ok(())
}

fn validate_engine(config: &TaskConfig) -> Result<(), ContractError> {
    let engine = &config.engine;

    engine.map_parameters().map_err(|e| {
        ContractError::config_validation("engine.map_length_x/y/resolution", e.to_string())
    })?;

    if !(engine.min_elevation < engine.max_elevation) {
        return Err(ContractError::config_validation(
            "engine.min_elevation / engine.max_elevation",
            format!(
                "min_elevation ({}) must be < max_elevation ({})",
                engine.min_elevation, engine.max_elevation
            ),
        ));
    }

    if !(engine.voxel_size.is_finite() && engine.voxel_size > 0.0) {
        return Err(ContractError::config_validation(
            "engine.voxel_size",
            format!("voxel_size must be > 0, got {}", engine.voxel_size),
        ));
    }

    for (field, value) in [
        ("engine.num_particles", engine.num_particles),
        ("engine.resample_frequency", engine.resample_frequency),
    ] {
        if value == 0 {
            return Err(ContractError::config_validation(field, "must be > 0"));
        }
    }

    for (field, value) in [
        ("engine.initial_sigma_x", engine.initial_sigma_x),
        ("engine.initial_sigma_y", engine.initial_sigma_y),
        ("engine.initial_sigma_yaw", engine.initial_sigma_yaw),
        ("engine.predict_sigma_x", engine.predict_sigma_x),
        ("engine.predict_sigma_y", engine.predict_sigma_y),
        ("engine.predict_sigma_yaw", engine.predict_sigma_yaw),
        ("engine.traversed_distance_threshold", engine.traversed_distance_threshold),
        ("engine.slope_sum_threshold", engine.slope_sum_threshold),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(ContractError::config_validation(
                field,
                format!("must be a finite value >= 0, got {value}"),
            ));
        }
    }
    Ok(())
}

fn validate_frames(config: &TaskConfig) -> Result<(), ContractError> {
    let frames = &config.frames;
    for (field, name) in [
        ("frames.body", &frames.body),
        ("frames.ground", &frames.ground),
        ("frames.hazcam", &frames.hazcam),
        ("frames.loccam", &frames.loccam),
    ] {
        if name.trim().is_empty() {
            return Err(ContractError::config_validation(
                field,
                "frame name cannot be empty",
            ));
        }
    }
    Ok(())
}

fn validate_debug(config: &TaskConfig) -> Result<(), ContractError> {
    let debug = &config.debug;
    if !debug.serialization {
        return Ok(());
    }
    for (field, path) in [
        ("debug.pose_path", &debug.pose_path),
        ("debug.local_map_path", &debug.local_map_path),
        ("debug.global_map_path", &debug.global_map_path),
    ] {
        if path.trim().is_empty() {
            return Err(ContractError::config_validation(
                field,
                "path cannot be empty when serialization is enabled",
            ));
        }
    }
    Ok(())
}

fn validate_cycle(config: &TaskConfig) -> Result<(), ContractError> {
    if config.cycle.period_ms == 0 {
        return Err(ContractError::config_validation(
            "cycle.period_ms",
            "period_ms must be > 0",
        ));
    }
    Ok(())
}

fn validate_transforms(config: &TaskConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, entry) in config.transforms.iter().enumerate() {
        if entry.source.is_empty() || entry.target.is_empty() {
            return Err(ContractError::config_validation(
                format!("transforms[{idx}]"),
                "source and target frames cannot be empty",
            ));
        }
        if entry.source == entry.target {
            return Err(ContractError::config_validation(
                format!("transforms[{idx}]"),
                format!("source and target are both '{}'", entry.source),
            ));
        }
        let t = entry.transform;
        let values = [
            t.location.x,
            t.location.y,
            t.location.z,
            t.rotation.roll,
            t.rotation.pitch,
            t.rotation.yaw,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ContractError::config_validation(
                format!("transforms[{idx}].transform"),
                "location and rotation must be finite",
            ));
        }

        // a pair and its inverse describe the same edge
        let key = if entry.source < entry.target {
            (entry.source.as_str(), entry.target.as_str())
        } else {
            (entry.target.as_str(), entry.source.as_str())
        };
        if !seen.insert(key) {
            return Err(ContractError::config_validation(
                format!("transforms[{idx}]"),
                format!(
                    "duplicate transform between '{}' and '{}'",
                    entry.source, entry.target
                ),
            ));
        }
    }
    Ok(())
}
