//! Per-goal dashboard records.
//!
//! A [`GoalReport`] carries the five formatted metric cells, each tagged
//! with its [`Status`], plus the flags the rendering and notification
//! layers key off. Markup and column alignment are left to the renderer.

use crate::core::metrics::{format_number, format_percent, DerivedMetrics};
use crate::core::status::{MetricKind, Overlay, Status, StatusClassifier};
use crate::core::windowing::{SampleWindows, WindowDeltas};
use crate::goal::Goal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// A formatted value and its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricCell {
    pub text: String,
    pub status: Status,
}

impl MetricCell {
    fn neutral(text: String) -> Self {
        Self {
            text,
            status: Status::Neutral,
        }
    }
}

/// Everything the dashboard shows for one goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalReport {
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<String>,
    /// Progress logged today
    pub today: MetricCell,
    /// Average weekly progress over the current period
    pub weekly: MetricCell,
    /// Required weekly rate
    pub weekly_goal: MetricCell,
    /// Weekly average as a share of the required rate
    pub rate_of_goal: MetricCell,
    /// Change against the prior period
    pub period_over_period: MetricCell,
    /// Deadline is imminent
    pub near_deadline: bool,
    /// Tagged by the caller's overlay
    pub warn: bool,
    /// Smaller magnitudes are better for this goal
    pub do_less: bool,
    /// Nothing logged today
    pub idle: bool,
    pub metrics: DerivedMetrics,
}

impl GoalReport {
    /// Whether the notification layer should hear about this goal.
    pub fn is_alerting(&self) -> bool {
        self.near_deadline || self.warn
    }
}

/// Builds [`GoalReport`]s for one run.
#[derive(Debug, Clone, Copy)]
pub struct ReportBuilder {
    windows: SampleWindows,
    classifier: StatusClassifier,
}

impl ReportBuilder {
    pub fn new(windows: SampleWindows, classifier: StatusClassifier) -> Self {
        Self {
            windows,
            classifier,
        }
    }

    pub fn windows(&self) -> &SampleWindows {
        &self.windows
    }

    /// Derive, classify and format a goal's metrics.
    pub fn build(
        &self,
        goal: &Goal,
        deltas: WindowDeltas,
        overlay: &dyn Overlay,
        now: DateTime<Utc>,
    ) -> GoalReport {
        let metrics = DerivedMetrics::derive(goal, deltas, &self.windows);
        let dir_sign = goal.direction.sign();

        let rate_of_goal = MetricCell {
            text: format_percent(metrics.rate_of_goal_pct, false),
            status: self.classifier.classify(
                MetricKind::RateOfGoal,
                metrics.rate_of_goal_pct,
                dir_sign,
                metrics.weekly_required_rate,
            ),
        };
        let period_over_period = MetricCell {
            text: format_percent(metrics.period_over_period_pct, true),
            status: self.classifier.classify(
                MetricKind::PeriodOverPeriod,
                metrics.period_over_period_pct,
                dir_sign,
                metrics.weekly_required_rate,
            ),
        };

        GoalReport {
            slug: goal.slug.clone(),
            title: goal.title.clone(),
            goal_type: goal.goal_type.clone(),
            today: MetricCell::neutral(format_number(metrics.today_delta)),
            weekly: MetricCell::neutral(format_number(metrics.weekly_average)),
            weekly_goal: MetricCell::neutral(format_number(metrics.weekly_required_rate)),
            rate_of_goal,
            period_over_period,
            near_deadline: self.classifier.is_near_deadline(goal, now),
            warn: overlay.is_flagged(goal, self.windows.as_of()),
            do_less: goal.direction.is_do_less(),
            idle: metrics.today_delta == 0.0,
            metrics,
        }
    }
}

/// Dashboard order: goals with progress today first, then by goal type
/// initial (descending), then by title.
pub fn sort_reports(reports: &mut [GoalReport]) {
    reports.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
}

fn sort_key(report: &GoalReport) -> (bool, Reverse<char>, &str) {
    let type_initial = report
        .goal_type
        .as_deref()
        .and_then(|t| t.chars().next())
        .unwrap_or('\0');
    (report.idle, Reverse(type_initial), report.title.as_str())
}

/// Swap `+`/`-` for up/down triangles. Used on do-less goals, where the
/// reader wants magnitudes small rather than large.
pub fn substitute_do_less_symbols(text: &str) -> String {
    text.replace('+', "\u{25B2}").replace('-', "\u{25BC}")
}

/// One plain-text dashboard line.
pub fn render_line(report: &GoalReport) -> String {
    let figures = format!(
        "{} today {} weekly vs {} ({} of goal, {} w/w)",
        report.today.text,
        report.weekly.text,
        report.weekly_goal.text,
        report.rate_of_goal.text,
        report.period_over_period.text,
    );
    let figures = if report.do_less {
        substitute_do_less_symbols(&figures)
    } else {
        figures
    };

    let mut line = format!("{figures} {}", report.title);
    if report.near_deadline {
        line.push_str(" [eep]");
    }
    if report.warn {
        line.push_str(" [warn]");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::{NoOverlay, WarnOverlay};
    use crate::goal::{Direction, GoalKind, RateUnit};
    use chrono::{Duration, NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 29, 8, 0, 0).unwrap()
    }

    fn builder() -> ReportBuilder {
        ReportBuilder::new(
            SampleWindows::new(NaiveDate::from_ymd_opt(2024, 3, 29).unwrap(), 2),
            StatusClassifier::default(),
        )
    }

    fn goal(slug: &str, yaw: i8, dir: i8) -> Goal {
        Goal::new(
            slug,
            slug.to_uppercase(),
            GoalKind::Cumulative,
            Direction::new(yaw, dir).unwrap(),
            1.0,
            RateUnit::Day,
            now() + Duration::hours(20),
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_report_cells() {
        let deltas = WindowDeltas {
            today: 1.0,
            period: 20.0,
            prior: 14.0,
        };
        let report = builder().build(&goal("read", 1, 1), deltas, &NoOverlay, now());

        assert_eq!(report.today.text, "+1.00");
        assert_eq!(report.weekly.text, "+10.50");
        assert_eq!(report.weekly_goal.text, "+7.00");
        assert_eq!(report.rate_of_goal.text, "150%");
        assert_eq!(report.rate_of_goal.status, Status::Favorable);
        assert_eq!(report.period_over_period.text, "+50%");
        assert_eq!(report.period_over_period.status, Status::Favorable);
        assert!(report.near_deadline);
        assert!(!report.warn);
        assert!(!report.idle);
        assert!(report.is_alerting());
    }

    #[test]
    fn test_do_less_report() {
        let deltas = WindowDeltas {
            today: 0.0,
            period: 20.0,
            prior: 14.0,
        };
        let overlay = WarnOverlay::new(vec!["snack".to_string()], Vec::new());
        let report = builder().build(&goal("snack", -1, 1), deltas, &overlay, now());

        assert!(report.do_less);
        assert!(report.idle);
        assert!(report.warn);
        assert!(!report.near_deadline);
        assert_eq!(report.rate_of_goal.status, Status::Unfavorable);

        let line = render_line(&report);
        assert!(line.starts_with("\u{25B2}0.00 today"));
        assert!(line.ends_with("SNACK [warn]"));
    }

    #[test]
    fn test_substitute_symbols() {
        assert_eq!(substitute_do_less_symbols("+3 -4"), "\u{25B2}3 \u{25BC}4");
    }

    #[test]
    fn test_sort_order() {
        let b = builder();
        let active = WindowDeltas {
            today: 1.0,
            ..WindowDeltas::default()
        };
        let idle = WindowDeltas::default();

        let mut reports = vec![
            b.build(&goal("zz", 1, 1).with_goal_type("hustler"), idle, &NoOverlay, now()),
            b.build(&goal("bb", 1, 1).with_goal_type("biker"), active, &NoOverlay, now()),
            b.build(&goal("aa", 1, 1).with_goal_type("hustler"), active, &NoOverlay, now()),
            b.build(&goal("cc", 1, 1).with_goal_type("hustler"), active, &NoOverlay, now()),
        ];
        sort_reports(&mut reports);

        let order: Vec<&str> = reports.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(order, vec!["aa", "cc", "bb", "zz"]);
    }
}
