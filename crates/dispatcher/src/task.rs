//! IngestTask - the periodic, non-blocking dispatch cycle

use std::sync::Arc;
use std::time::Instant;

use contracts::{Channel, MappingEngine, SampleInput, TaskConfig, TransformService};
use converters::cloud_to_native;
use debug_export::{DebugExporter, ExportReport};
use tokio::runtime::Handle;
use tracing::{debug, info, instrument};

use crate::inputs::{StaticTransforms, TaskInputs};
use crate::slot::{ChannelSlot, Job};
use crate::stats::ChannelMetricsSnapshot;
use crate::TaskError;

/// What one channel did in one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPoll {
    /// Idle and nothing new to read
    NoData,
    /// A worker was launched
    Dispatched,
    /// Previous worker still running; `dropped` tells whether a pending
    /// sample was discarded
    Busy { dropped: bool },
}

/// Result of one cycle
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Per-channel outcome, in dispatch order
    pub channels: Vec<(Channel, ChannelPoll)>,
    /// Export results, `None` when `debug_info` is off
    pub export: Option<ExportReport>,
}

impl CycleReport {
    pub fn poll(&self, channel: Channel) -> Option<ChannelPoll> {
        self.channels
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, p)| *p)
    }

    pub fn dispatched(&self) -> usize {
        self.channels
            .iter()
            .filter(|(_, p)| *p == ChannelPoll::Dispatched)
            .count()
    }
}

/// Builder for configuring an [`IngestTask`]
pub struct IngestTaskBuilder {
    config: TaskConfig,
    engine: Arc<dyn MappingEngine>,
    inputs: TaskInputs,
    exporter: Option<DebugExporter>,
    runtime: Option<Handle>,
}

impl IngestTaskBuilder {
    pub fn new(config: TaskConfig, engine: Arc<dyn MappingEngine>, inputs: TaskInputs) -> Self {
        Self {
            config,
            engine,
            inputs,
            exporter: None,
            runtime: None,
        }
    }

    /// Exporter for the debug step; defaults to one built from the config's
    /// `[debug]` section with no backends attached
    pub fn exporter(mut self, exporter: DebugExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Runtime whose blocking pool runs channel workers; defaults to the
    /// current runtime
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Resolve static transforms, then configure the engine.
    ///
    /// # Errors
    /// - [`TaskError::TransformNotFound`] for any missing static transform,
    ///   before the engine is touched
    /// - [`TaskError::Engine`] if the engine rejects its parameters
    /// - [`TaskError::NoRuntime`] outside a Tokio runtime with no handle given
    #[instrument(name = "ingest_task_configure", skip_all)]
    pub fn configure(self, transforms: &dyn TransformService) -> Result<IngestTask, TaskError> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| TaskError::NoRuntime)?,
        };
        if self.config.cycle.period_ms == 0 {
            return Err(TaskError::config("cycle.period_ms", "must be > 0"));
        }

        let static_transforms = StaticTransforms::resolve(transforms, &self.config.frames)?;
        self.engine
            .set_parameters(&self.config.engine)
            .map_err(TaskError::Engine)?;

        let exporter = self
            .exporter
            .unwrap_or_else(|| DebugExporter::new(self.config.debug.clone()));
        let slots = Channel::ALL.map(ChannelSlot::new);

        info!(
            channels = slots.len(),
            debug_info = exporter.is_enabled(),
            period_ms = self.config.cycle.period_ms,
            "ingest task configured"
        );

        Ok(IngestTask {
            engine: self.engine,
            runtime,
            transforms: static_transforms,
            inputs: self.inputs,
            slots,
            exporter,
            cycles: 0,
        })
    }
}

/// The configured ingestion task.
///
/// Each [`IngestTask::run_cycle`] polls every channel without blocking:
/// a busy channel drops its pending sample, an idle one with new data
/// launches one worker doing conversion plus a single engine call.
pub struct IngestTask {
    engine: Arc<dyn MappingEngine>,
    runtime: Handle,
    transforms: StaticTransforms,
    inputs: TaskInputs,
    slots: [ChannelSlot; 5],
    exporter: DebugExporter,
    cycles: u64,
}

impl IngestTask {
    pub fn engine(&self) -> &Arc<dyn MappingEngine> {
        &self.engine
    }

    pub fn static_transforms(&self) -> &StaticTransforms {
        &self.transforms
    }

    pub fn exporter(&self) -> &DebugExporter {
        &self.exporter
    }

    /// Cycles run so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Get metrics for all channels
    pub fn metrics(&self) -> Vec<ChannelMetricsSnapshot> {
        self.slots.iter().map(|s| s.metrics().snapshot()).collect()
    }

    pub fn channel_metrics(&self, channel: Channel) -> Option<ChannelMetricsSnapshot> {
        self.slots
            .iter()
            .find(|s| s.channel() == channel)
            .map(|s| s.metrics().snapshot())
    }

    /// Run one cycle: every channel, then the export step.
    pub fn run_cycle(&mut self) -> CycleReport {
        let started = Instant::now();
        self.cycles += 1;

        let mut report = CycleReport::default();
        for index in 0..self.slots.len() {
            let poll = self.poll_channel(index);
            report.channels.push((self.slots[index].channel(), poll));
        }

        if self.exporter.is_enabled() {
            report.export = Some(self.exporter.export(self.engine.as_ref()));
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        metrics::histogram!("ga_ingest_cycle_duration_ms").record(elapsed_ms);
        debug!(
            cycle = self.cycles,
            dispatched = report.dispatched(),
            elapsed_ms,
            "cycle complete"
        );
        report
    }

    fn poll_channel(&mut self, index: usize) -> ChannelPoll {
        let slot = &mut self.slots[index];
        let channel = slot.channel();

        if slot.is_busy() {
            let dropped = self.inputs.discard(channel);
            if dropped {
                slot.metrics().inc_dropped_busy();
                debug!(channel = %channel, "channel busy, sample dropped");
            }
            return ChannelPoll::Busy { dropped };
        }

        match next_job(channel, &mut self.inputs, &self.engine, &self.transforms) {
            Some(job) => {
                slot.launch(&self.runtime, job);
                ChannelPoll::Dispatched
            }
            None => ChannelPoll::NoData,
        }
    }

    /// Wait for every in-flight worker. Running workers are not cancelled.
    #[instrument(name = "ingest_task_shutdown", skip(self), fields(cycles = self.cycles))]
    pub async fn shutdown(mut self) -> Vec<ChannelMetricsSnapshot> {
        for slot in &mut self.slots {
            slot.drain().await;
        }
        let metrics = self.metrics();
        info!("ingest task shutdown complete");
        metrics
    }
}

/// Consume the channel's new sample, if any, and build its worker job.
///
/// The pan-camera channel needs a new cloud and a new transform together;
/// otherwise neither is read.
fn next_job(
    channel: Channel,
    inputs: &mut TaskInputs,
    engine: &Arc<dyn MappingEngine>,
    transforms: &StaticTransforms,
) -> Option<Job> {
    let engine = Arc::clone(engine);
    let job: Job = match channel {
        Channel::PoseGuess => {
            let sample = inputs.pose_guess.read_new()?;
            let body_to_ground = transforms.body_to_ground;
            Box::new(move || engine.predict(sample.pose, body_to_ground))
        }
        Channel::Hazcam => {
            let cloud = inputs.hazcam_cloud.read_new()?;
            let sensor_to_body = transforms.hazcam_to_body;
            Box::new(move || engine.update_from_cloud(cloud_to_native(&cloud), sensor_to_body))
        }
        Channel::Loccam => {
            let cloud = inputs.loccam_cloud.read_new()?;
            let sensor_to_body = transforms.loccam_to_body;
            Box::new(move || engine.update_from_cloud(cloud_to_native(&cloud), sensor_to_body))
        }
        Channel::Pancam => {
            if !(inputs.pancam_cloud.has_new() && inputs.pancam_transform.has_new()) {
                return None;
            }
            let cloud = inputs.pancam_cloud.read_new()?;
            let sensor_to_body = inputs.pancam_transform.read_new()?.pose;
            Box::new(move || engine.update_from_cloud(cloud_to_native(&cloud), sensor_to_body))
        }
        Channel::Orbiter => {
            let cloud = inputs.orbiter_cloud.read_new()?;
            Box::new(move || engine.register_prior_cloud(cloud_to_native(&cloud)))
        }
    };
    Some(job)
}
