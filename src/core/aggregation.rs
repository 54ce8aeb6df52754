//! Aggregation strategies: how a run of values inside one window collapses
//! to a single progress delta.

use crate::goal::GoalKind;
use serde::{Deserialize, Serialize};

/// Per-window accumulator state for one goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum AggregationStrategy {
    /// Sums independent increments.
    Cumulative { total: f64 },
    /// Tracks the first and last absolute values.
    Endpoint {
        initial: Option<f64>,
        latest: Option<f64>,
    },
    /// Like `Endpoint`, but a zero reading is an odometer reset and the
    /// distance covered before it is carried forward.
    Odometer {
        initial: Option<f64>,
        latest: Option<f64>,
        accumulated: f64,
    },
}

impl AggregationStrategy {
    /// Fresh, empty state for the given goal kind.
    pub fn for_kind(kind: GoalKind) -> Self {
        match kind {
            GoalKind::Cumulative => AggregationStrategy::Cumulative { total: 0.0 },
            GoalKind::Endpoint => AggregationStrategy::Endpoint {
                initial: None,
                latest: None,
            },
            GoalKind::Odometer => AggregationStrategy::Odometer {
                initial: None,
                latest: None,
                accumulated: 0.0,
            },
        }
    }

    /// Record a value that falls inside this window.
    pub fn record(&mut self, value: f64) {
        match self {
            AggregationStrategy::Cumulative { total } => *total += value,
            AggregationStrategy::Endpoint { initial, latest } => {
                if initial.is_none() {
                    *initial = Some(value);
                }
                *latest = Some(value);
            }
            AggregationStrategy::Odometer {
                initial,
                latest,
                accumulated,
            } => {
                if initial.is_none() {
                    *initial = Some(value);
                }
                if value == 0.0 {
                    *accumulated = latest.unwrap_or(0.0);
                }
                *latest = Some(*accumulated + value);
            }
        }
    }

    /// Record a value from an earlier window, seeding this window's
    /// baseline. Later calls overwrite earlier ones.
    pub fn record_prior_period(&mut self, value: f64) {
        match self {
            AggregationStrategy::Cumulative { .. } => {}
            AggregationStrategy::Endpoint { initial, .. }
            | AggregationStrategy::Odometer { initial, .. } => *initial = Some(value),
        }
    }

    /// Progress made within the window. Zero until both edges are known.
    pub fn delta(&self) -> f64 {
        match self {
            AggregationStrategy::Cumulative { total } => *total,
            AggregationStrategy::Endpoint { initial, latest }
            | AggregationStrategy::Odometer {
                initial, latest, ..
            } => match (initial, latest) {
                (Some(initial), Some(latest)) => latest - initial,
                _ => 0.0,
            },
        }
    }
}
