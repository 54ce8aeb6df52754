//! Direction-aware status classification.
//!
//! A metric is compared against its centerpoint (100% for rate-of-goal,
//! 0% for period-over-period). Small deviations fall in a dead zone and are
//! neutral; larger ones are favorable when they move the way the goal
//! wants to go.

use crate::goal::Goal;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default half-width of the neutral band, in percentage points.
pub const DEFAULT_DEAD_ZONE_PCT: f64 = 10.0;

/// Default distance to the deadline that counts as "near".
pub const DEFAULT_NEAR_DEADLINE_SECS: i64 = 2 * 24 * 60 * 60;

/// Classification verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Favorable,
    Unfavorable,
    Neutral,
}

/// Which percentage is being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    RateOfGoal,
    PeriodOverPeriod,
}

impl MetricKind {
    /// Value that means "on pace" / "no change".
    pub fn centerpoint(&self) -> f64 {
        match self {
            MetricKind::RateOfGoal => 100.0,
            MetricKind::PeriodOverPeriod => 0.0,
        }
    }
}

/// Maps metrics and goal directionality onto a [`Status`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusClassifier {
    dead_zone_pct: f64,
    near_deadline: Duration,
    flag_do_less_deadlines: bool,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self {
            dead_zone_pct: DEFAULT_DEAD_ZONE_PCT,
            near_deadline: Duration::seconds(DEFAULT_NEAR_DEADLINE_SECS),
            flag_do_less_deadlines: false,
        }
    }
}

impl StatusClassifier {
    pub fn new(dead_zone_pct: f64, near_deadline: Duration, flag_do_less_deadlines: bool) -> Self {
        Self {
            dead_zone_pct,
            near_deadline,
            flag_do_less_deadlines,
        }
    }

    /// Classify a percentage for a goal with directionality sign `dir_sign`.
    ///
    /// `weekly_required_rate` only matters for rate-of-goal, which is
    /// neutral when the goal has no enforced rate.
    pub fn classify(
        &self,
        kind: MetricKind,
        value: Option<f64>,
        dir_sign: i8,
        weekly_required_rate: f64,
    ) -> Status {
        let Some(value) = value else {
            return Status::Neutral;
        };
        if kind == MetricKind::RateOfGoal && weekly_required_rate == 0.0 {
            return Status::Neutral;
        }

        let deviation = value - kind.centerpoint();
        if deviation.abs() < self.dead_zone_pct {
            Status::Neutral
        } else if (deviation > 0.0) == (dir_sign == 1) {
            Status::Favorable
        } else {
            Status::Unfavorable
        }
    }

    /// Whether the goal derails within the proximity window after `now`.
    ///
    /// Do-less goals are only flagged when `flag_do_less_deadlines` is set.
    pub fn is_near_deadline(&self, goal: &Goal, now: DateTime<Utc>) -> bool {
        if goal.direction.is_do_less() && !self.flag_do_less_deadlines {
            return false;
        }
        let remaining = goal.deadline - now;
        remaining > Duration::zero() && remaining < self.near_deadline
    }
}

/// Externally supplied "warn" tagging.
pub trait Overlay {
    fn is_flagged(&self, goal: &Goal, as_of: NaiveDate) -> bool;
}

/// No goal is ever flagged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverlay;

impl Overlay for NoOverlay {
    fn is_flagged(&self, _goal: &Goal, _as_of: NaiveDate) -> bool {
        false
    }
}

impl Overlay for BTreeSet<String> {
    fn is_flagged(&self, goal: &Goal, _as_of: NaiveDate) -> bool {
        self.contains(&goal.slug)
    }
}

/// Inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Warn overlay built from a set of flagged goals plus blackout ranges
/// during which every goal is flagged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarnOverlay {
    pub goals: BTreeSet<String>,
    pub blackouts: Vec<DateRange>,
}

impl WarnOverlay {
    pub fn new(goals: impl IntoIterator<Item = String>, blackouts: Vec<DateRange>) -> Self {
        Self {
            goals: goals.into_iter().collect(),
            blackouts,
        }
    }
}

impl Overlay for WarnOverlay {
    fn is_flagged(&self, goal: &Goal, as_of: NaiveDate) -> bool {
        self.goals.contains(&goal.slug) || self.blackouts.iter().any(|r| r.contains(as_of))
    }
}
