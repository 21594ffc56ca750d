//! Latest-value sample ports
//!
//! One writer, any number of readers. Each reader tracks its own "seen"
//! version, so `has_new` is answered without blocking or locking the writer
//! out for longer than a clone.

use std::sync::Arc;

use contracts::{ContractError, OutputPort, SampleInput};
use tokio::sync::watch;
use tracing::trace;

use crate::{PortMetrics, PortMetricsSnapshot};

/// Create a connected writer/reader pair
pub fn sample_port<T>(name: impl Into<String>) -> (SampleWriter<T>, SamplePort<T>)
where
    T: Clone + Send + Sync,
{
    let name = name.into();
    let (tx, rx) = watch::channel(None);
    let metrics = Arc::new(PortMetrics::new());

    let writer = SampleWriter {
        name: name.clone(),
        tx,
        metrics: metrics.clone(),
    };
    let port = SamplePort { name, rx, metrics };
    (writer, port)
}

/// Writing half: publishing replaces the current sample
pub struct SampleWriter<T> {
    name: String,
    tx: watch::Sender<Option<T>>,
    metrics: Arc<PortMetrics>,
}

impl<T> SampleWriter<T>
where
    T: Clone + Send + Sync,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the current sample. Never blocks, works with no readers.
    pub fn publish(&self, sample: T) {
        self.tx.send_replace(Some(sample));
        self.metrics.record_written();
        metrics::counter!("ga_ingest_port_samples_written_total", "port" => self.name.clone())
            .increment(1);
        trace!(port = %self.name, "sample published");
    }

    /// Copy of the current sample, read or not
    pub fn latest(&self) -> Option<T> {
        self.tx.borrow().clone()
    }

    /// New reader; the current sample counts as already seen
    pub fn subscribe(&self) -> SamplePort<T> {
        SamplePort {
            name: self.name.clone(),
            rx: self.tx.subscribe(),
            metrics: self.metrics.clone(),
        }
    }

    pub fn metrics(&self) -> PortMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl<T> Clone for SampleWriter<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            tx: self.tx.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<T> OutputPort<T> for SampleWriter<T>
where
    T: Clone + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, sample: T) -> Result<(), ContractError> {
        self.publish(sample);
        Ok(())
    }
}

/// Reading half.
///
/// A port whose writers are all gone reports no new data.
pub struct SamplePort<T> {
    name: String,
    rx: watch::Receiver<Option<T>>,
    metrics: Arc<PortMetrics>,
}

impl<T> SamplePort<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> PortMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl<T> SampleInput<T> for SamplePort<T>
where
    T: Clone + Send + Sync,
{
    fn has_new(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    fn read_new(&mut self) -> Option<T> {
        if !self.has_new() {
            return None;
        }
        let sample = self.rx.borrow_and_update().clone();
        if sample.is_some() {
            self.metrics.record_read();
        }
        sample
    }

    fn discard(&mut self) -> bool {
        if !self.has_new() {
            return false;
        }
        let pending = self.rx.borrow_and_update().is_some();
        if pending {
            self.metrics.record_discarded();
        }
        pending
    }
}
