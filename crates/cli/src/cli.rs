//! `ga-ingest` command line.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// GA Ingest - multi-sensor ingestion and dispatch for the GA SLAM engine
#[derive(Parser, Debug)]
#[command(
    name = "ga-ingest",
    author,
    version,
    about = "GA SLAM multi-sensor ingestion task",
    long_about = "Runs the periodic ingestion cycle of the GA SLAM mapping engine.\n\n\
                  Reads camera clouds, orbiter priors and pose guesses, dispatches one \n\
                  non-blocking worker per channel, and exports debug snapshots of the \n\
                  engine state."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GA_INGEST_VERBOSE")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "GA_INGEST_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the ingestion task against the mock engine and mock sensors
    Run(RunArgs),

    /// Check a task configuration and report warnings
    Validate(ValidateArgs),

    /// Describe the engine, frames and exports of a task configuration
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Task configuration (TOML or JSON)
    #[arg(short, long, default_value = "task.toml", env = "GA_INGEST_CONFIG")]
    pub config: PathBuf,

    /// Override the cycle period from configuration
    #[arg(long, env = "GA_INGEST_PERIOD_MS")]
    pub period_ms: Option<u64>,

    /// Maximum number of cycles to run (0 = unlimited)
    #[arg(long, default_value = "0", env = "GA_INGEST_MAX_CYCLES")]
    pub max_cycles: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "GA_INGEST_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Directory for exported images, clouds and relative snapshot paths.
    /// Without it images and clouds are only logged.
    #[arg(short, long, env = "GA_INGEST_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Mock camera cloud rate
    #[arg(long, default_value = "10", env = "GA_INGEST_SENSOR_HZ")]
    pub sensor_hz: f64,

    /// Mock pose guess rate
    #[arg(long, default_value = "20", env = "GA_INGEST_POSE_HZ")]
    pub pose_hz: f64,

    /// Mock orbiter prior rate
    #[arg(long, default_value = "0.2", env = "GA_INGEST_ORBITER_HZ")]
    pub orbiter_hz: f64,

    /// Points per mock camera cloud
    #[arg(long, default_value = "400")]
    pub cloud_points: usize,

    /// Artificial latency of each mock engine cloud update, in milliseconds
    #[arg(long, default_value = "0")]
    pub engine_delay_ms: u64,

    /// Prometheus port for ga_ingest metrics (0 = disabled)
    #[arg(long, default_value = "9000", env = "GA_INGEST_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Task configuration to check
    #[arg(short, long, default_value = "task.toml")]
    pub config: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Task configuration to describe
    #[arg(short, long, default_value = "task.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show every engine parameter
    #[arg(long)]
    pub engine: bool,

    /// Show configured static transforms
    #[arg(long)]
    pub transforms: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Multi-line, for reading in a terminal
    #[default]
    Pretty,
    /// One line per event
    Compact,
}
