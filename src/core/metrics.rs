//! Derived trend metrics and their display formatting.
//!
//! Percentages with a zero denominator are `None`, shown as `N/A`.

use crate::core::windowing::{SampleWindows, WindowDeltas};
use crate::goal::Goal;
use serde::{Deserialize, Serialize};

/// Text shown for an undefined percentage.
pub const NOT_AVAILABLE: &str = "N/A";

/// Metrics derived for one goal over one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Progress logged today
    pub today_delta: f64,
    /// Progress over the current period, today excluded
    pub period_delta: f64,
    /// Progress over the prior period
    pub prior_delta: f64,
    /// Average weekly progress over the current period, today included
    pub weekly_average: f64,
    /// Goal rate normalized to one week
    pub weekly_required_rate: f64,
    /// Weekly average as a percentage of the required rate
    pub rate_of_goal_pct: Option<f64>,
    /// Change against the prior period, in percent
    pub period_over_period_pct: Option<f64>,
}

impl DerivedMetrics {
    /// Derive metrics from a goal's window deltas.
    pub fn derive(goal: &Goal, deltas: WindowDeltas, windows: &SampleWindows) -> Self {
        let weekly_required_rate = goal.weekly_rate();
        let current_total = deltas.period + deltas.today;
        let weekly_average = current_total / windows.weeks() as f64;

        let rate_of_goal_pct = percent(weekly_average, weekly_required_rate);

        // A goal younger than the prior period has no baseline.
        let prior_denominator = if windows.prior_period_eligible(goal.activation) {
            deltas.prior
        } else {
            0.0
        };
        let period_over_period_pct = percent(current_total - deltas.prior, prior_denominator);

        Self {
            today_delta: deltas.today,
            period_delta: deltas.period,
            prior_delta: deltas.prior,
            weekly_average,
            weekly_required_rate,
            rate_of_goal_pct,
            period_over_period_pct,
        }
    }

    /// Whether the goal has any enforced rate.
    pub fn has_required_rate(&self) -> bool {
        self.weekly_required_rate != 0.0
    }
}

/// `100 * numerator / denominator`, or `None` when the denominator is zero.
pub fn percent(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(100.0 * numerator / denominator)
    }
}

/// Format a quantity with an explicit sign and magnitude-adaptive precision.
///
/// Above 10000 the value is shown in thousands with one decimal, above 1000
/// in thousands with two decimals, above 100 with no decimals, and with two
/// decimals otherwise.
pub fn format_number(n: f64) -> String {
    let magnitude = n.abs();
    if magnitude > 10_000.0 {
        format!("{:+.1}K", n / 1000.0)
    } else if magnitude > 1000.0 {
        format!("{:+.2}K", n / 1000.0)
    } else if magnitude > 100.0 {
        format!("{n:+.0}")
    } else {
        format!("{n:+.2}")
    }
}

/// Format a percentage rounded to a whole number.
///
/// `signed` forces a leading `+` on positive values.
pub fn format_percent(pct: Option<f64>, signed: bool) -> String {
    match pct {
        None => NOT_AVAILABLE.to_string(),
        Some(p) if signed => format!("{p:+.0}%"),
        Some(p) => format!("{p:.0}%"),
    }
}
