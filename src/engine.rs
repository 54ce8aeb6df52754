//! Batch evaluation of a user's goals.
//!
//! Each goal runs through accumulate -> derive -> classify on its own.
//! Malformed goals are reported and skipped; they never abort the batch.

use crate::alerts::AlertSet;
use crate::config::Config;
use crate::core::{
    sort_reports, AccumulatorSet, GoalReport, IngestCounts, Overlay, ReportBuilder, SampleWindows,
    StatusClassifier,
};
use crate::goal::{Goal, GoalError};
use crate::stats::{RunLog, RunStats};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A goal that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalFailure {
    pub goal: String,
    pub error: String,
}

impl From<&GoalError> for GoalFailure {
    fn from(err: &GoalError) -> Self {
        Self {
            goal: err.goal().to_string(),
            error: err.to_string(),
        }
    }
}

/// Result of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub as_of: NaiveDate,
    /// Reports in dashboard order
    pub reports: Vec<GoalReport>,
    pub failures: Vec<GoalFailure>,
    pub alerts: AlertSet,
    pub stats: RunStats,
}

/// Evaluates goals against one set of sample windows.
#[derive(Debug, Clone, Copy)]
pub struct Engine {
    builder: ReportBuilder,
    hide_rateless_goals: bool,
}

impl Engine {
    pub fn new(windows: SampleWindows, classifier: StatusClassifier) -> Self {
        Self {
            builder: ReportBuilder::new(windows, classifier),
            hide_rateless_goals: false,
        }
    }

    /// Engine for the configured windows and thresholds, as of `as_of`.
    pub fn from_config(config: &Config, as_of: NaiveDate) -> Self {
        Self::new(config.windows(as_of), config.classifier())
            .hide_rateless_goals(config.hide_rateless_goals)
    }

    /// Leave goals with no enforced rate out of run results.
    pub fn hide_rateless_goals(mut self, hide: bool) -> Self {
        self.hide_rateless_goals = hide;
        self
    }

    pub fn windows(&self) -> &SampleWindows {
        self.builder.windows()
    }

    /// Ingest one goal into `accumulators` and build its report, along with
    /// how many of its datapoints landed in a window.
    pub fn evaluate(
        &self,
        goal: &Goal,
        accumulators: &mut AccumulatorSet,
        overlay: &dyn Overlay,
        now: DateTime<Utc>,
    ) -> (GoalReport, IngestCounts) {
        let counts = accumulators.ingest(goal);
        let deltas = accumulators.deltas(&goal.slug).unwrap_or_default();
        (self.builder.build(goal, deltas, overlay, now), counts)
    }

    /// Evaluate a batch of parsed goals with fresh accumulator state.
    pub fn run<'a>(
        &self,
        goals: impl IntoIterator<Item = &'a Result<Goal, GoalError>>,
        overlay: &dyn Overlay,
        now: DateTime<Utc>,
    ) -> RunOutcome {
        let log = RunLog::new();
        let mut accumulators = AccumulatorSet::new(*self.windows());
        let mut reports = Vec::new();
        let mut failures = Vec::new();

        for parsed in goals {
            let goal = match parsed {
                Ok(goal) => goal,
                Err(err) => {
                    warn!(goal = %err.goal(), error = %err, "skipping malformed goal");
                    log.record_goal_failed();
                    failures.push(GoalFailure::from(err));
                    continue;
                }
            };

            if self.hide_rateless_goals && goal.weekly_rate() == 0.0 {
                log.record_goal_skipped();
                continue;
            }

            let (report, counts) = self.evaluate(goal, &mut accumulators, overlay, now);
            log.record_datapoints(counts.recorded, counts.ignored);
            log.record_goal_evaluated();
            reports.push(report);
        }

        sort_reports(&mut reports);
        let alerts = AlertSet::from_reports(&reports);
        let stats = log.stats();

        info!(
            as_of = %self.windows().as_of(),
            evaluated = stats.goals_evaluated,
            failed = stats.goals_failed,
            skipped = stats.goals_skipped,
            alerting = alerts.len(),
            "run complete"
        );

        RunOutcome {
            as_of: self.windows().as_of(),
            reports,
            failures,
            alerts,
            stats,
        }
    }
}
