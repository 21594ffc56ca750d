//! ChannelSlot - single-slot mailbox for one channel's worker task

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use contracts::{Channel, ContractError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use crate::stats::ChannelMetrics;

/// Boxed conversion + engine call, run on a blocking worker
pub type Job = Box<dyn FnOnce() -> Result<(), ContractError> + Send + 'static>;

/// Holds at most one in-flight worker for a channel
pub struct ChannelSlot {
    channel: Channel,
    task: Option<JoinHandle<()>>,
    metrics: Arc<ChannelMetrics>,
}

impl ChannelSlot {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            task: None,
            metrics: Arc::new(ChannelMetrics::new(channel)),
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<ChannelMetrics> {
        &self.metrics
    }

    /// Non-blocking poll of the previous worker. A finished worker is
    /// released so the slot is free again.
    pub fn is_busy(&mut self) -> bool {
        match &self.task {
            Some(task) if !task.is_finished() => true,
            Some(_) => {
                self.task = None;
                false
            }
            None => false,
        }
    }

    /// Launch `job` on the blocking pool of `runtime`.
    ///
    /// Returns `false` without running the job if the slot is busy.
    pub fn launch(&mut self, runtime: &Handle, job: Job) -> bool {
        if self.is_busy() {
            return false;
        }
        if !self.metrics.begin_dispatch() {
            warn!(channel = %self.channel, "channel marked in flight with an empty slot");
        }

        let channel = self.channel;
        let metrics = Arc::clone(&self.metrics);
        self.task = Some(runtime.spawn_blocking(move || run_job(channel, job, &metrics)));
        debug!(channel = %channel, "channel worker dispatched");
        true
    }

    /// Wait for the in-flight worker, if any
    #[instrument(name = "channel_slot_drain", skip(self), fields(channel = %self.channel))]
    pub async fn drain(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(channel = %self.channel, error = ?e, "channel worker join failed");
            }
        }
    }
}

/// Worker body: engine errors and panics are logged and counted, never
/// propagated
fn run_job(channel: Channel, job: Job, metrics: &ChannelMetrics) {
    let ok = match catch_unwind(AssertUnwindSafe(job)) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error!(channel = %channel, error = %e, "channel update failed");
            false
        }
        Err(_) => {
            error!(channel = %channel, "channel worker panicked");
            false
        }
    };
    metrics.end_dispatch(ok);
}
