//! Sliding sample windows and per-goal accumulation.
//!
//! Datapoints are sorted into three windows relative to an as-of date `T`
//! and a window length of `N` weeks:
//!
//! - `Today`: exactly `T`
//! - `CurrentPeriod`: `[T - N weeks, T]`, today excluded (it has its own bucket)
//! - `PriorPeriod`: `[T - 2N weeks, T - N weeks)`
//!
//! Each goal owns one [`AggregationStrategy`] per window. Points from an
//! earlier window also seed the baseline of the later ones so endpoint
//! goals can measure change across the window edge.

use crate::core::aggregation::AggregationStrategy;
use crate::goal::{Goal, GoalKind};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// The window a datapoint falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowBucket {
    Today,
    CurrentPeriod,
    PriorPeriod,
}

/// Window boundaries for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleWindows {
    /// The run's "today"
    as_of: NaiveDate,
    /// Length of each period in weeks
    weeks: u32,
}

impl SampleWindows {
    /// Create windows ending at `as_of`, each `weeks` long.
    ///
    /// A zero-week window is bumped to one week.
    pub fn new(as_of: NaiveDate, weeks: u32) -> Self {
        Self {
            as_of,
            weeks: weeks.max(1),
        }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn weeks(&self) -> u32 {
        self.weeks
    }

    /// First day of the current period (inclusive).
    pub fn current_start(&self) -> NaiveDate {
        self.as_of - Duration::weeks(self.weeks as i64)
    }

    /// First day of the prior period (inclusive).
    pub fn prior_start(&self) -> NaiveDate {
        self.as_of - Duration::weeks(2 * self.weeks as i64)
    }

    /// Midnight UTC at the start of the prior period.
    pub fn prior_start_instant(&self) -> DateTime<Utc> {
        self.prior_start().and_time(NaiveTime::MIN).and_utc()
    }

    /// Whether a goal activated at `activation` existed for the whole prior
    /// period and can be compared against it.
    pub fn prior_period_eligible(&self, activation: DateTime<Utc>) -> bool {
        activation < self.prior_start_instant()
    }

    /// Classify a date. Dates after `as_of` or before the prior period
    /// belong to no window.
    pub fn bucket(&self, date: NaiveDate) -> Option<WindowBucket> {
        if date == self.as_of {
            Some(WindowBucket::Today)
        } else if date > self.as_of {
            None
        } else if date >= self.current_start() {
            Some(WindowBucket::CurrentPeriod)
        } else if date >= self.prior_start() {
            Some(WindowBucket::PriorPeriod)
        } else {
            None
        }
    }
}

/// Deltas read off a goal's three accumulators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowDeltas {
    pub today: f64,
    pub period: f64,
    pub prior: f64,
}

/// Counts from ingesting one goal's datapoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestCounts {
    pub recorded: u64,
    pub ignored: u64,
}

/// The three accumulators owned by one goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalAccumulator {
    today: AggregationStrategy,
    period: AggregationStrategy,
    prior: AggregationStrategy,
}

impl GoalAccumulator {
    pub fn new(kind: GoalKind) -> Self {
        Self {
            today: AggregationStrategy::for_kind(kind),
            period: AggregationStrategy::for_kind(kind),
            prior: AggregationStrategy::for_kind(kind),
        }
    }

    /// Feed one value that has already been bucketed.
    ///
    /// Prior-period values must only be passed when the goal is eligible
    /// for a prior-period comparison.
    pub fn record(&mut self, bucket: WindowBucket, value: f64) {
        match bucket {
            WindowBucket::Today => self.today.record(value),
            WindowBucket::CurrentPeriod => {
                self.today.record_prior_period(value);
                self.period.record(value);
            }
            WindowBucket::PriorPeriod => {
                self.today.record_prior_period(value);
                self.period.record_prior_period(value);
                self.prior.record(value);
            }
        }
    }

    pub fn deltas(&self) -> WindowDeltas {
        WindowDeltas {
            today: self.today.delta(),
            period: self.period.delta(),
            prior: self.prior.delta(),
        }
    }
}

/// Caller-owned accumulator state for one run, keyed by goal slug.
#[derive(Debug, Clone)]
pub struct AccumulatorSet {
    windows: SampleWindows,
    accumulators: HashMap<String, GoalAccumulator>,
}

impl AccumulatorSet {
    pub fn new(windows: SampleWindows) -> Self {
        Self {
            windows,
            accumulators: HashMap::new(),
        }
    }

    pub fn windows(&self) -> &SampleWindows {
        &self.windows
    }

    /// Run all of a goal's datapoints through its accumulators.
    ///
    /// Ingesting the same slug twice starts that goal over.
    pub fn ingest(&mut self, goal: &Goal) -> IngestCounts {
        let eligible = self.windows.prior_period_eligible(goal.activation);
        let mut accumulator = GoalAccumulator::new(goal.kind);
        let mut counts = IngestCounts::default();

        for point in goal.datapoints() {
            match self.windows.bucket(point.date) {
                Some(WindowBucket::PriorPeriod) if !eligible => counts.ignored += 1,
                Some(bucket) => {
                    accumulator.record(bucket, point.value);
                    counts.recorded += 1;
                }
                None => counts.ignored += 1,
            }
        }

        debug!(
            goal = %goal.slug,
            recorded = counts.recorded,
            ignored = counts.ignored,
            prior_eligible = eligible,
            "ingested datapoints"
        );

        self.accumulators.insert(goal.slug.clone(), accumulator);
        counts
    }

    /// Deltas for a goal, or `None` if it was never ingested.
    pub fn deltas(&self, slug: &str) -> Option<WindowDeltas> {
        self.accumulators.get(slug).map(GoalAccumulator::deltas)
    }

    pub fn len(&self) -> usize {
        self.accumulators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulators.is_empty()
    }
}
