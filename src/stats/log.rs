//! Per-run bookkeeping.
//!
//! Counts what a run did with its input so a caller can tell a quiet
//! dashboard apart from one whose goals failed to parse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single run.
#[derive(Debug)]
pub struct RunLog {
    /// Goals that produced a report
    goals_evaluated: AtomicU64,
    /// Goals rejected as malformed
    goals_failed: AtomicU64,
    /// Goals left off the dashboard by configuration
    goals_skipped: AtomicU64,
    /// Datapoints fed to an accumulator
    datapoints_recorded: AtomicU64,
    /// Datapoints outside every window
    datapoints_ignored: AtomicU64,
    /// Run start time
    run_start: DateTime<Utc>,
}

impl RunLog {
    pub fn new() -> Self {
        Self {
            goals_evaluated: AtomicU64::new(0),
            goals_failed: AtomicU64::new(0),
            goals_skipped: AtomicU64::new(0),
            datapoints_recorded: AtomicU64::new(0),
            datapoints_ignored: AtomicU64::new(0),
            run_start: Utc::now(),
        }
    }

    pub fn record_goal_evaluated(&self) {
        self.goals_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_goal_failed(&self) {
        self.goals_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_goal_skipped(&self) {
        self.goals_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of ingesting one goal's datapoints.
    pub fn record_datapoints(&self, recorded: u64, ignored: u64) {
        self.datapoints_recorded
            .fetch_add(recorded, Ordering::Relaxed);
        self.datapoints_ignored.fetch_add(ignored, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> RunStats {
        RunStats {
            goals_evaluated: self.goals_evaluated.load(Ordering::Relaxed),
            goals_failed: self.goals_failed.load(Ordering::Relaxed),
            goals_skipped: self.goals_skipped.load(Ordering::Relaxed),
            datapoints_recorded: self.datapoints_recorded.load(Ordering::Relaxed),
            datapoints_ignored: self.datapoints_ignored.load(Ordering::Relaxed),
            run_start: self.run_start,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Run Statistics:\n\
             - Goals evaluated: {}\n\
             - Goals failed: {}\n\
             - Goals skipped: {}\n\
             - Datapoints recorded: {}\n\
             - Datapoints outside the sample windows: {}",
            stats.goals_evaluated,
            stats.goals_failed,
            stats.goals_skipped,
            stats.datapoints_recorded,
            stats.datapoints_ignored,
        )
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of run statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub goals_evaluated: u64,
    pub goals_failed: u64,
    pub goals_skipped: u64,
    pub datapoints_recorded: u64,
    pub datapoints_ignored: u64,
    pub run_start: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_log_counting() {
        let log = RunLog::new();

        log.record_goal_evaluated();
        log.record_goal_evaluated();
        log.record_goal_failed();
        log.record_datapoints(10, 3);
        log.record_datapoints(2, 0);

        let stats = log.stats();
        assert_eq!(stats.goals_evaluated, 2);
        assert_eq!(stats.goals_failed, 1);
        assert_eq!(stats.goals_skipped, 0);
        assert_eq!(stats.datapoints_recorded, 12);
        assert_eq!(stats.datapoints_ignored, 3);
    }

    #[test]
    fn test_summary_format() {
        let log = RunLog::new();
        let summary = log.summary();

        assert!(summary.contains("Goals evaluated"));
        assert!(summary.contains("Goals failed"));
        assert!(summary.contains("Datapoints recorded"));
    }
}
