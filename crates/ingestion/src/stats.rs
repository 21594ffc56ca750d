//! Per-port counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Sample port metrics, shared by the writer and reader halves
#[derive(Debug, Default)]
pub struct PortMetrics {
    /// Samples published by the writer
    pub samples_written: AtomicU64,

    /// Samples consumed by the reader
    pub samples_read: AtomicU64,

    /// Samples marked seen without being consumed
    pub samples_discarded: AtomicU64,
}

impl PortMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_written(&self) {
        self.samples_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read(&self) {
        self.samples_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded(&self) {
        self.samples_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> PortMetricsSnapshot {
        PortMetricsSnapshot {
            samples_written: self.samples_written.load(Ordering::Relaxed),
            samples_read: self.samples_read.load(Ordering::Relaxed),
            samples_discarded: self.samples_discarded.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortMetricsSnapshot {
    pub samples_written: u64,
    pub samples_read: u64,
    pub samples_discarded: u64,
}

impl PortMetricsSnapshot {
    /// Samples never consumed: overwritten, discarded or still pending
    pub fn samples_unread(&self) -> u64 {
        self.samples_written.saturating_sub(self.samples_read)
    }
}
