//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{EngineParameters, TaskConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    map: MapInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    engine: Option<EngineParameters>,
    frames: contracts::FrameConfig,
    cycle_period_ms: u64,
    debug: contracts::DebugConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    transforms: Vec<TransformInfo>,
}

#[derive(Serialize)]
struct MapInfo {
    length_x: f64,
    length_y: f64,
    resolution: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    cells_per_side: Option<usize>,
}

#[derive(Serialize)]
struct TransformInfo {
    source: String,
    target: String,
    xyz: [f64; 3],
    rpy_deg: [f64; 3],
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &TaskConfig, args: &InfoArgs) -> ConfigInfo {
    let engine = &config.engine;
    let transforms = if args.transforms {
        config
            .transforms
            .iter()
            .map(|t| {
                let l = t.transform.location;
                let r = t.transform.rotation;
                TransformInfo {
                    source: t.source.clone(),
                    target: t.target.clone(),
                    xyz: [l.x, l.y, l.z],
                    rpy_deg: [r.roll, r.pitch, r.yaw],
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", config.version),
        map: MapInfo {
            length_x: engine.map_length_x,
            length_y: engine.map_length_y,
            resolution: engine.map_resolution,
            cells_per_side: engine.map_parameters().ok().map(|p| p.size),
        },
        engine: args.engine.then(|| engine.clone()),
        frames: config.frames.clone(),
        cycle_period_ms: config.cycle.period_ms,
        debug: config.debug.clone(),
        transforms,
    }
}

fn print_config_info(config: &TaskConfig, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 GA Ingest Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let engine = &config.engine;
    println!("🗺  Map");
    println!("   ├─ Version: {:?}", config.version);
    println!(
        "   ├─ Extent: {} x {} m",
        engine.map_length_x, engine.map_length_y
    );
    println!("   ├─ Resolution: {} m", engine.map_resolution);
    match engine.map_parameters() {
        Ok(params) => println!("   └─ Cells: {0} x {0}", params.size),
        Err(e) => println!("   └─ Cells: invalid ({e})"),
    }

    if args.engine {
        println!("\n⚙️  Engine Parameters");
        println!(
            "   ├─ Elevation: [{}, {}] m",
            engine.min_elevation, engine.max_elevation
        );
        println!("   ├─ Voxel size: {} m", engine.voxel_size);
        println!(
            "   ├─ Particles: {} (resample every {})",
            engine.num_particles, engine.resample_frequency
        );
        println!(
            "   ├─ Initial sigma: x={} y={} yaw={}",
            engine.initial_sigma_x, engine.initial_sigma_y, engine.initial_sigma_yaw
        );
        println!(
            "   ├─ Predict sigma: x={} y={} yaw={}",
            engine.predict_sigma_x, engine.predict_sigma_y, engine.predict_sigma_yaw
        );
        println!(
            "   ├─ Traversed distance threshold: {} m",
            engine.traversed_distance_threshold
        );
        println!("   └─ Slope sum threshold: {}", engine.slope_sum_threshold);
    }

    let frames = &config.frames;
    println!("\n🧭 Frames");
    println!("   ├─ Body: {}", frames.body);
    println!("   ├─ Ground: {}", frames.ground);
    println!("   ├─ Hazcam: {}", frames.hazcam);
    println!("   └─ Loccam: {}", frames.loccam);

    println!("\n⏱  Cycle: every {} ms", config.cycle.period_ms);

    let debug = &config.debug;
    println!("\n🐞 Debug");
    println!("   ├─ debug_info: {}", debug.debug_info);
    println!("   ├─ raw_map: {}", debug.raw_map);
    println!("   ├─ cloud: {}", debug.cloud);
    if debug.serialization {
        println!(
            "   └─ serialization: pose={} local={} global={}",
            debug.pose_path, debug.local_map_path, debug.global_map_path
        );
    } else {
        println!("   └─ serialization: false");
    }

    println!("\n🔗 Static Transforms ({})", config.transforms.len());
    if args.transforms {
        for (i, t) in config.transforms.iter().enumerate() {
            let prefix = if i + 1 == config.transforms.len() { "└─" } else { "├─" };
            let l = t.transform.location;
            let r = t.transform.rotation;
            println!(
                "   {} {} -> {}  xyz=({}, {}, {}) rpy=({}, {}, {})°",
                prefix, t.source, t.target, l.x, l.y, l.z, r.roll, r.pitch, r.yaw
            );
        }
    }

    println!();
}
