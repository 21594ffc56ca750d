//! Debug exporter backends chosen from the `[debug]` section

use std::path::Path;

use contracts::{DebugConfig, TaskConfig};
use debug_export::{DebugExporter, FileCloudPort, FileImagePort, FileSnapshotWriter, LogPort};
use tracing::info;

use crate::error::Result;

/// Build the exporter for a run.
///
/// With an output directory, images and clouds are written there and
/// relative snapshot paths are resolved against it. Without one, images and
/// clouds are only logged.
pub fn build_exporter(config: &TaskConfig, output_dir: Option<&Path>) -> Result<DebugExporter> {
    let mut debug_cfg = config.debug.clone();
    if let Some(dir) = output_dir {
        rebase_paths(&mut debug_cfg, dir);
    }
    let mut exporter = DebugExporter::new(debug_cfg.clone());
    if !debug_cfg.debug_info {
        return Ok(exporter);
    }

    match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            if debug_cfg.raw_map {
                let engine = &config.engine;
                exporter = exporter.with_image_port(FileImagePort::new(
                    "raw_map",
                    dir.join("images"),
                    engine.min_elevation,
                    engine.max_elevation,
                )?);
            }
            if debug_cfg.cloud {
                exporter =
                    exporter.with_cloud_port(FileCloudPort::new("map_cloud", dir.join("clouds"))?);
            }
        }
        None => {
            if debug_cfg.raw_map {
                exporter = exporter.with_image_port(LogPort::new("raw_map"));
            }
            if debug_cfg.cloud {
                exporter = exporter.with_cloud_port(LogPort::new("map_cloud"));
            }
        }
    }
    if debug_cfg.serialization {
        exporter = exporter.with_snapshot_writer(FileSnapshotWriter::new());
    }

    info!(
        raw_map = debug_cfg.raw_map,
        cloud = debug_cfg.cloud,
        serialization = debug_cfg.serialization,
        output_dir = ?output_dir,
        "debug exporter configured"
    );
    Ok(exporter)
}

fn rebase_paths(debug: &mut DebugConfig, dir: &Path) {
    for path in [
        &mut debug.pose_path,
        &mut debug.local_map_path,
        &mut debug.global_map_path,
    ] {
        if Path::new(path.as_str()).is_relative() {
            *path = dir.join(path.as_str()).display().to_string();
        }
    }
}
