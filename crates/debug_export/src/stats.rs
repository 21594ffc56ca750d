//! Export metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Export, ExportOutcome};

/// Counters for the export step, across all behaviours
#[derive(Debug, Default)]
pub struct ExportMetrics {
    /// Export passes run (debug_info on)
    passes: AtomicU64,
    /// Total successful writes
    written: AtomicU64,
    /// Total write failures
    failed: AtomicU64,
}

impl ExportMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_passes(&self) {
        self.passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::Relaxed)
    }

    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Count one outcome locally and on the metrics facade
    pub fn record(&self, export: Export, outcome: &ExportOutcome) {
        match outcome {
            ExportOutcome::Skipped => return,
            ExportOutcome::Written => self.written.fetch_add(1, Ordering::Relaxed),
            ExportOutcome::Failed(_) => self.failed.fetch_add(1, Ordering::Relaxed),
        };
        metrics::counter!(
            "ga_ingest_export_total",
            "export" => export.as_str(),
            "status" => outcome.status()
        )
        .increment(1);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> ExportMetricsSnapshot {
        ExportMetricsSnapshot {
            passes: self.passes(),
            written: self.written(),
            failed: self.failed(),
        }
    }
}

/// Snapshot of export metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportMetricsSnapshot {
    pub passes: u64,
    pub written: u64,
    pub failed: u64,
}
