//! Pipeline orchestrator - wires mock sensors, the mock engine and the
//! ingest task, then drives the cycle.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use config_loader::TransformTable;
use contracts::{MappingEngine, TaskConfig};
use dispatcher::{CycleReport, IngestTask, IngestTaskBuilder};
use engine_mock::{MockEngine, MockEngineConfig};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::exporter::build_exporter;
use super::sources::{MockSensors, MockSettings};
use super::{PipelineStats, StopReason};
use crate::error::{CliError, Result};

/// Cycles between map coverage gauge updates
const COVERAGE_EVERY: u64 = 10;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated task configuration
    pub task: TaskConfig,

    /// Maximum number of cycles (None = unlimited)
    pub max_cycles: Option<u64>,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Export directory (None = log images and clouds)
    pub output_dir: Option<PathBuf>,

    pub mock: MockSettings,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves, the timeout elapses or the cycle limit
    /// is reached. In-flight workers are awaited before returning.
    pub async fn run<S>(self, shutdown: S) -> Result<PipelineStats>
    where
        S: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let task_config = &self.config.task;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)
                .map_err(|e| CliError::metrics(format!("{e:#}")))?;
            info!("Metrics endpoint available on port {}", port);
        }

        let engine = Arc::new(MockEngine::with_config(MockEngineConfig {
            update_delay: self.config.mock.engine_delay,
            ..Default::default()
        }));
        info!("Running against the MOCK engine");

        let (sensors, inputs) = MockSensors::start(&self.config.mock, &task_config.frames)?;

        let exporter = match build_exporter(task_config, self.config.output_dir.as_deref()) {
            Ok(exporter) => exporter,
            Err(e) => {
                sensors.stop().await;
                return Err(e);
            }
        };

        let transforms = TransformTable::from_config(&task_config.transforms);
        let configured = IngestTaskBuilder::new(task_config.clone(), engine.clone(), inputs)
            .exporter(exporter)
            .configure(&transforms);
        let mut task = match configured {
            Ok(task) => task,
            Err(e) => {
                sensors.stop().await;
                return Err(e.into());
            }
        };

        let mut stats = PipelineStats {
            active_sources: sensors.len(),
            ..Default::default()
        };

        let period = Duration::from_millis(task_config.cycle.period_ms);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let timeout = self.config.timeout;
        let deadline = async move {
            match timeout {
                Some(t) => tokio::time::sleep(t).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(shutdown);

        info!(
            period_ms = task_config.cycle.period_ms,
            max_cycles = ?self.config.max_cycles,
            "Ingest cycle running (MOCK mode)"
        );

        stats.stop_reason = loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping ingest cycle...");
                    break StopReason::Signal;
                }
                _ = &mut deadline => {
                    warn!(timeout_secs = timeout.map(|t| t.as_secs()), "Ingest run timed out");
                    break StopReason::Timeout;
                }
                _ = ticker.tick() => {}
            }

            let started = Instant::now();
            let report = run_cycle_blocking(&mut task);
            stats.record_cycle(&report, started.elapsed());

            observability::record_pose(&engine.pose());
            if task.cycles() % COVERAGE_EVERY == 0 {
                observability::record_map_coverage("raw", &engine.raw_map().snapshot());
                info!(
                    cycles = task.cycles(),
                    dispatched = stats.cycle_stats.summary().dispatched,
                    "Ingest progress"
                );
            }

            if let Some(max) = self.config.max_cycles {
                if task.cycles() >= max {
                    info!(cycles = task.cycles(), "Reached max cycles limit");
                    break StopReason::CycleLimit;
                }
            }
        };

        info!("Shutting down ingest task...");
        sensors.stop().await;
        stats.channels = task.shutdown().await;
        stats.engine_calls = engine.calls();
        observability::record_map_coverage("raw", &engine.raw_map().snapshot());
        observability::record_map_coverage("global", &engine.global_map().snapshot());

        stats.duration = start_time.elapsed();
        info!(
            duration_secs = stats.duration.as_secs_f64(),
            rate_hz = format!("{:.2}", stats.rate_hz()),
            "Ingest shutdown complete"
        );
        Ok(stats)
    }
}

/// One cycle with its file exports kept off the async workers.
///
/// The export step writes PNG, PLY and bincode files synchronously, so on a
/// multi-thread runtime the cycle runs inside `block_in_place`.
fn run_cycle_blocking(task: &mut IngestTask) -> CycleReport {
    match Handle::current().runtime_flavor() {
        RuntimeFlavor::MultiThread => tokio::task::block_in_place(|| task.run_cycle()),
        _ => task.run_cycle(),
    }
}
