//! Ingestion metrics
//!
//! Metric descriptions for the Prometheus exporter, engine-state gauges and
//! an in-memory aggregator for end-of-run summaries.

use std::collections::BTreeMap;

use contracts::{Channel, GridMap, Pose};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge, Unit};

/// Register descriptions for every metric the ingestion crates emit.
///
/// Call once after the recorder is installed.
pub fn describe_metrics() {
    describe_counter!(
        "ga_ingest_channel_dispatched_total",
        Unit::Count,
        "Workers launched per channel"
    );
    describe_counter!(
        "ga_ingest_channel_failed_total",
        Unit::Count,
        "Workers that returned an error or panicked, per channel"
    );
    describe_counter!(
        "ga_ingest_channel_dropped_busy_total",
        Unit::Count,
        "Samples discarded because the channel's worker was still running"
    );
    describe_counter!(
        "ga_ingest_export_total",
        Unit::Count,
        "Debug export outcomes by export and status"
    );
    describe_counter!(
        "ga_ingest_port_samples_written_total",
        Unit::Count,
        "Samples published on input ports"
    );
    describe_histogram!(
        "ga_ingest_cycle_duration_ms",
        Unit::Milliseconds,
        "Wall time of one dispatch cycle including the export step"
    );
    describe_gauge!(
        "ga_ingest_map_observed_ratio",
        "Share of grid cells holding an elevation"
    );
    describe_gauge!("ga_ingest_pose_x", "Engine pose x in meters");
    describe_gauge!("ga_ingest_pose_y", "Engine pose y in meters");
    describe_gauge!("ga_ingest_pose_yaw", "Engine pose yaw in radians");
}

/// Record how much of `map` is observed, labelled by map name
pub fn record_map_coverage(name: &'static str, map: &GridMap) {
    let cells = map.size() * map.size();
    let ratio = if cells > 0 {
        map.mean_z().observed_count() as f64 / cells as f64
    } else {
        0.0
    };
    gauge!("ga_ingest_map_observed_ratio", "map" => name).set(ratio);
}

pub fn record_pose(pose: &Pose) {
    let t = pose.translation();
    gauge!("ga_ingest_pose_x").set(t.x);
    gauge!("ga_ingest_pose_y").set(t.y);
    gauge!("ga_ingest_pose_yaw").set(pose.yaw());
}

/// Per-channel tallies kept by [`CycleStatsAggregator`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelTally {
    pub dispatched: u64,
    pub dropped_busy: u64,
}

impl ChannelTally {
    /// Share of samples dropped, in percent
    pub fn drop_rate(&self) -> f64 {
        let seen = self.dispatched + self.dropped_busy;
        if seen == 0 {
            0.0
        } else {
            self.dropped_busy as f64 / seen as f64 * 100.0
        }
    }
}

/// Cycle statistics aggregator
///
/// Aggregates in memory so a run can end with a summary.
#[derive(Debug, Clone, Default)]
pub struct CycleStatsAggregator {
    pub cycles: u64,
    pub export_failures: u64,
    pub cycle_ms: RunningStats,
    pub channels: BTreeMap<Channel, ChannelTally>,
}

impl CycleStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cycle(&mut self, elapsed_ms: f64) {
        self.cycles += 1;
        self.cycle_ms.push(elapsed_ms);
    }

    pub fn record_dispatch(&mut self, channel: Channel) {
        self.channels.entry(channel).or_default().dispatched += 1;
    }

    pub fn record_dropped(&mut self, channel: Channel) {
        self.channels.entry(channel).or_default().dropped_busy += 1;
    }

    pub fn record_export_failures(&mut self, failures: usize) {
        self.export_failures += failures as u64;
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            cycles: self.cycles,
            dispatched: self.channels.values().map(|t| t.dispatched).sum(),
            dropped_busy: self.channels.values().map(|t| t.dropped_busy).sum(),
            export_failures: self.export_failures,
            cycle_ms: StatsSummary::from(&self.cycle_ms),
            channels: self.channels.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub cycles: u64,
    pub dispatched: u64,
    pub dropped_busy: u64,
    pub export_failures: u64,
    pub cycle_ms: StatsSummary,
    pub channels: BTreeMap<Channel, ChannelTally>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Ingestion Summary ===")?;
        writeln!(f, "Cycles: {}", self.cycles)?;
        writeln!(f, "Cycle time (ms): {}", self.cycle_ms)?;
        writeln!(f, "Workers dispatched: {}", self.dispatched)?;
        writeln!(f, "Samples dropped (busy): {}", self.dropped_busy)?;
        writeln!(f, "Export failures: {}", self.export_failures)?;

        if !self.channels.is_empty() {
            writeln!(f, "Per channel:")?;
            for (channel, tally) in &self.channels {
                writeln!(
                    f,
                    "  {:<10} dispatched={} dropped={} ({:.2}%)",
                    channel.as_str(),
                    tally.dispatched,
                    tally.dropped_busy,
                    tally.drop_rate()
                )?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online mean/variance (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::MapParameters;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_tallies_per_channel() {
        let mut aggregator = CycleStatsAggregator::new();
        aggregator.record_cycle(1.5);
        aggregator.record_dispatch(Channel::Hazcam);
        aggregator.record_cycle(2.5);
        aggregator.record_dropped(Channel::Hazcam);
        aggregator.record_dispatch(Channel::PoseGuess);
        aggregator.record_export_failures(2);

        let summary = aggregator.summary();
        assert_eq!(summary.cycles, 2);
        assert_eq!(summary.dispatched, 2);
        assert_eq!(summary.dropped_busy, 1);
        assert_eq!(summary.export_failures, 2);
        assert!((summary.cycle_ms.mean - 2.0).abs() < 1e-10);

        let hazcam = summary.channels[&Channel::Hazcam];
        assert!((hazcam.drop_rate() - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = CycleStatsAggregator::new();
        aggregator.record_cycle(4.0);
        aggregator.record_dispatch(Channel::Loccam);
        aggregator.record_dropped(Channel::Loccam);
        aggregator.record_dropped(Channel::Loccam);
        aggregator.record_dropped(Channel::Loccam);

        let output = aggregator.summary().to_string();
        assert!(output.contains("Cycles: 1"));
        assert!(output.contains("loccam"));
        assert!(output.contains("75.00%"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = CycleStatsAggregator::new().summary();
        assert_eq!(summary.cycle_ms.to_string(), "N/A");
        assert_eq!(ChannelTally::default().drop_rate(), 0.0);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let map = GridMap::new(MapParameters::new(2.0, 2.0, 1.0).unwrap());
        record_map_coverage("raw", &map);
        record_pose(&Pose::identity());
        describe_metrics();
    }
}
