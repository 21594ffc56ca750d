//! Run statistics.

use std::fmt;
use std::time::Duration;

use dispatcher::{ChannelMetricsSnapshot, ChannelPoll, CycleReport};
use engine_mock::EngineCalls;
use observability::CycleStatsAggregator;

/// Why the cycle loop ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    #[default]
    Signal,
    Timeout,
    CycleLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::Signal => "shutdown signal",
            StopReason::Timeout => "timeout",
            StopReason::CycleLimit => "cycle limit",
        })
    }
}

/// Statistics from a run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub stop_reason: StopReason,
    pub duration: Duration,
    pub active_sources: usize,
    /// Export behaviours written over the run
    pub exports_written: u64,
    /// Final per-channel counters, taken after in-flight workers finished
    pub channels: Vec<ChannelMetricsSnapshot>,
    pub engine_calls: EngineCalls,
    pub cycle_stats: CycleStatsAggregator,
}

impl PipelineStats {
    pub fn record_cycle(&mut self, report: &CycleReport, elapsed: Duration) {
        self.cycle_stats.record_cycle(elapsed.as_secs_f64() * 1000.0);
        for (channel, poll) in &report.channels {
            match poll {
                ChannelPoll::Dispatched => self.cycle_stats.record_dispatch(*channel),
                ChannelPoll::Busy { dropped: true } => self.cycle_stats.record_dropped(*channel),
                _ => {}
            }
        }
        if let Some(export) = &report.export {
            self.exports_written += export.written() as u64;
            self.cycle_stats
                .record_export_failures(export.failures().len());
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycle_stats.cycles
    }

    /// Cycles per second
    pub fn rate_hz(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.cycles() as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Ingestion Statistics                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Stopped by: {}", self.stop_reason);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Cycles: {} ({:.2} Hz)", self.cycles(), self.rate_hz());
        println!("   ├─ Active sources: {}", self.active_sources);
        println!("   └─ Exports written: {}", self.exports_written);

        println!("\n📡 Channels");
        for (i, c) in self.channels.iter().enumerate() {
            let prefix = if i + 1 == self.channels.len() { "└─" } else { "├─" };
            println!(
                "   {} {:<10} dispatched={} completed={} failed={} dropped_busy={}",
                prefix,
                c.channel.as_str(),
                c.dispatched,
                c.completed,
                c.failed,
                c.dropped_busy
            );
        }

        let calls = self.engine_calls;
        println!("\n⚙️  Engine Calls");
        println!("   ├─ set_parameters: {}", calls.set_parameters);
        println!("   ├─ predict: {}", calls.predict);
        println!("   ├─ update_from_cloud: {}", calls.update_from_cloud);
        println!("   └─ register_prior_cloud: {}", calls.register_prior_cloud);

        println!("\n{}", self.cycle_stats.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Channel;

    #[test]
    fn test_record_cycle_counts_dispatch_and_drops() {
        let mut stats = PipelineStats::default();
        let report = CycleReport {
            channels: vec![
                (Channel::PoseGuess, ChannelPoll::Dispatched),
                (Channel::Hazcam, ChannelPoll::Busy { dropped: true }),
                (Channel::Loccam, ChannelPoll::Busy { dropped: false }),
                (Channel::Pancam, ChannelPoll::NoData),
            ],
            export: None,
        };
        stats.record_cycle(&report, Duration::from_millis(2));
        stats.record_cycle(&CycleReport::default(), Duration::from_millis(4));

        let summary = stats.cycle_stats.summary();
        assert_eq!(stats.cycles(), 2);
        assert_eq!(summary.dispatched, 1);
        assert_eq!(summary.dropped_busy, 1);
        assert!((summary.cycle_ms.mean - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_without_duration_is_zero() {
        assert_eq!(PipelineStats::default().rate_hz(), 0.0);
    }
}
