//! Channel metrics for observability

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use contracts::Channel;

/// Metrics for a single channel
#[derive(Debug)]
pub struct ChannelMetrics {
    channel: Channel,
    /// Worker tasks launched
    dispatched: AtomicU64,
    /// Worker tasks whose engine call succeeded
    completed: AtomicU64,
    /// Worker tasks whose engine call failed or panicked
    failed: AtomicU64,
    /// Samples discarded because the channel was busy
    dropped_busy: AtomicU64,
    /// A worker is running
    in_flight: AtomicBool,
}

impl ChannelMetrics {
    /// Create new metrics instance
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            dispatched: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            dropped_busy: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Mark a worker launched.
    ///
    /// Returns `false` if a worker was already marked in flight.
    pub fn begin_dispatch(&self) -> bool {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        metrics::counter!("ga_ingest_channel_dispatched_total", "channel" => self.channel.as_str())
            .increment(1);
        !self.in_flight.swap(true, Ordering::SeqCst)
    }

    /// Mark the running worker finished
    pub fn end_dispatch(&self, ok: bool) {
        if ok {
            self.completed.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failed.fetch_add(1, Ordering::SeqCst);
            metrics::counter!("ga_ingest_channel_failed_total", "channel" => self.channel.as_str())
                .increment(1);
        }
        self.in_flight.store(false, Ordering::SeqCst);
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn dropped_busy(&self) -> u64 {
        self.dropped_busy.load(Ordering::SeqCst)
    }

    /// Increment busy-drop count
    pub fn inc_dropped_busy(&self) {
        self.dropped_busy.fetch_add(1, Ordering::SeqCst);
        metrics::counter!("ga_ingest_channel_dropped_busy_total", "channel" => self.channel.as_str())
            .increment(1);
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> ChannelMetricsSnapshot {
        ChannelMetricsSnapshot {
            channel: self.channel,
            dispatched: self.dispatched(),
            completed: self.completed(),
            failed: self.failed(),
            dropped_busy: self.dropped_busy(),
            in_flight: self.in_flight(),
        }
    }
}

/// Snapshot of channel metrics (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMetricsSnapshot {
    pub channel: Channel,
    pub dispatched: u64,
    pub completed: u64,
    pub failed: u64,
    pub dropped_busy: u64,
    pub in_flight: bool,
}
