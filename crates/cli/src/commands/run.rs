//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{MockSettings, Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if let Some(period_ms) = args.period_ms {
        info!(period_ms, "Overriding cycle period from CLI");
        config.cycle.period_ms = period_ms;
        config_loader::ConfigLoader::validate(&config).context("Invalid --period-ms override")?;
    }

    info!(
        period_ms = config.cycle.period_ms,
        map_size = config.engine.map_length_x,
        resolution = config.engine.map_resolution,
        transforms = config.transforms.len(),
        debug_info = config.debug.debug_info,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        task: config,
        max_cycles: (args.max_cycles > 0).then_some(args.max_cycles),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
        output_dir: args.output_dir.clone(),
        mock: MockSettings {
            sensor_hz: args.sensor_hz,
            pose_hz: args.pose_hz,
            orbiter_hz: args.orbiter_hz,
            cloud_points: args.cloud_points,
            engine_delay: (args.engine_delay_ms > 0)
                .then(|| Duration::from_millis(args.engine_delay_ms)),
        },
    };

    info!("Starting ingest task...");
    let stats = Pipeline::new(pipeline_config)
        .run(shutdown_signal())
        .await
        .context("Ingest run failed")?;

    info!(
        cycles = stats.cycles(),
        stop_reason = %stats.stop_reason,
        duration_secs = stats.duration.as_secs_f64(),
        "Ingest run completed"
    );
    stats.print_summary();

    info!("GA Ingest finished");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM. A handler that cannot be installed never
/// fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &contracts::TaskConfig) {
    let engine = &config.engine;
    println!("\n=== Configuration Summary ===\n");
    println!("Engine:");
    println!(
        "  Map: {} x {} m @ {} m",
        engine.map_length_x, engine.map_length_y, engine.map_resolution
    );
    println!(
        "  Elevation: [{}, {}] m",
        engine.min_elevation, engine.max_elevation
    );
    println!("  Particles: {}", engine.num_particles);

    let frames = &config.frames;
    println!("\nFrames:");
    println!(
        "  body={} ground={} hazcam={} loccam={}",
        frames.body, frames.ground, frames.hazcam, frames.loccam
    );

    println!("\nCycle: every {} ms", config.cycle.period_ms);

    if !config.transforms.is_empty() {
        println!("\nStatic transforms ({}):", config.transforms.len());
        for t in &config.transforms {
            println!("  - {} -> {}", t.source, t.target);
        }
    }

    let debug = &config.debug;
    if debug.debug_info {
        println!("\nDebug exports:");
        println!("  raw_map image: {}", debug.raw_map);
        println!("  map cloud: {}", debug.cloud);
        println!("  serialization: {}", debug.serialization);
    }

    println!();
}
