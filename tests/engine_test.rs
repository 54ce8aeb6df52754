//! End-to-end tests for the dashboard engine

use beedash::core::{DateRange, NoOverlay, Status, WarnOverlay};
use beedash::{parse_user_data, render_line, AlertSet, Config, Engine, GoalReport, RunOutcome};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::json;

const LONG_AGO: i64 = 1_672_531_200; // 2023-01-01
const MID_PRIOR_PERIOD: i64 = 1_710_028_800; // 2024-03-10
const TOMORROW_NOON: i64 = 1_711_800_000; // 2024-03-30T12:00Z
const NEXT_WEEK: i64 = 1_712_275_200; // 2024-04-05

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 29).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 29, 9, 0, 0).unwrap()
}

fn user_document() -> String {
    json!({
        "username": "alice",
        "timezone": "America/Los_Angeles",
        "goals": [
            {
                "slug": "read",
                "title": "Read",
                "goal_type": "hustler",
                "odom": false,
                "aggday": "sum",
                "mathishard": [null, null, 1.0],
                "runits": "d",
                "yaw": 1,
                "dir": 1,
                "initday": LONG_AGO,
                "losedate": TOMORROW_NOON,
                "datapoints": [
                    {"daystamp": "20240301", "value": 7.0},
                    {"daystamp": "20240310", "value": 7.0},
                    {"daystamp": "20240315", "value": 10.0},
                    {"daystamp": "20240320", "value": 10.0},
                    {"daystamp": "20240329", "value": 1.0},
                    {"daystamp": "20240330", "value": 100.0}
                ]
            },
            {
                "slug": "inbox",
                "title": "Inbox",
                "goal_type": "inboxer",
                "odom": false,
                "aggday": "last",
                "rate": -5.0,
                "runits": "w",
                "yaw": -1,
                "dir": -1,
                "initday": MID_PRIOR_PERIOD,
                "losedate": NEXT_WEEK,
                "datapoints": [
                    {"daystamp": "20240312", "value": 50.0},
                    {"daystamp": "20240320", "value": 45.0},
                    {"daystamp": "20240329", "value": 40.0}
                ]
            },
            {
                "slug": "bike",
                "title": "Bike",
                "goal_type": "biker",
                "odom": true,
                "aggday": "last",
                "rate": 10.0,
                "runits": "w",
                "yaw": 1,
                "dir": 1,
                "initday": LONG_AGO,
                "losedate": NEXT_WEEK,
                "datapoints": [
                    {"daystamp": "20240305", "value": 100.0},
                    {"daystamp": "20240314", "value": 120.0},
                    {"daystamp": "20240316", "value": 130.0},
                    {"daystamp": "20240318", "value": 0.0},
                    {"daystamp": "20240325", "value": 15.0}
                ]
            },
            {
                "slug": "broken",
                "title": "Broken",
                "odom": false,
                "aggday": "sum",
                "yaw": 1,
                "dir": 1,
                "initday": LONG_AGO,
                "losedate": NEXT_WEEK
            }
        ]
    })
    .to_string()
}

fn run_with(overlay: &dyn beedash::Overlay) -> RunOutcome {
    let data = parse_user_data(&user_document()).expect("document parses");
    Engine::from_config(&Config::default(), as_of()).run(&data.goals, overlay, now())
}

fn report<'a>(outcome: &'a RunOutcome, slug: &str) -> &'a GoalReport {
    outcome
        .reports
        .iter()
        .find(|r| r.slug == slug)
        .unwrap_or_else(|| panic!("no report for {slug}"))
}

#[test]
fn test_cumulative_goal_ahead_of_pace() {
    let outcome = run_with(&NoOverlay);
    let read = report(&outcome, "read");

    assert_eq!(read.metrics.today_delta, 1.0);
    assert_eq!(read.metrics.period_delta, 20.0);
    assert_eq!(read.metrics.prior_delta, 14.0);

    assert_eq!(read.weekly.text, "+10.50");
    assert_eq!(read.weekly_goal.text, "+7.00");
    assert_eq!(read.rate_of_goal.text, "150%");
    assert_eq!(read.rate_of_goal.status, Status::Favorable);
    assert_eq!(read.period_over_period.text, "+50%");
    assert_eq!(read.period_over_period.status, Status::Favorable);
    assert!(read.near_deadline);

    assert_eq!(
        render_line(read),
        "+1.00 today +10.50 weekly vs +7.00 (150% of goal, +50% w/w) Read [eep]"
    );
}

#[test]
fn test_young_endpoint_goal_has_no_baseline() {
    let outcome = run_with(&NoOverlay);
    let inbox = report(&outcome, "inbox");

    // The 03-12 reading predates the current period and the goal is too
    // young for a prior-period comparison, so it is dropped.
    assert_eq!(inbox.metrics.today_delta, -5.0);
    assert_eq!(inbox.metrics.period_delta, 0.0);
    assert_eq!(inbox.period_over_period.text, "N/A");
    assert_eq!(inbox.period_over_period.status, Status::Neutral);

    assert_eq!(inbox.rate_of_goal.text, "50%");
    assert_eq!(inbox.rate_of_goal.status, Status::Unfavorable);
    assert!(!inbox.near_deadline);
}

#[test]
fn test_odometer_goal_survives_reset() {
    let outcome = run_with(&NoOverlay);
    let bike = report(&outcome, "bike");

    assert_eq!(bike.metrics.prior_delta, 20.0);
    assert_eq!(bike.metrics.period_delta, 25.0);
    assert_eq!(bike.metrics.today_delta, 0.0);
    assert!(bike.idle);

    assert_eq!(bike.rate_of_goal.text, "125%");
    assert_eq!(bike.rate_of_goal.status, Status::Favorable);
    assert_eq!(bike.period_over_period.text, "+25%");
    assert_eq!(bike.period_over_period.status, Status::Favorable);
}

#[test]
fn test_run_bookkeeping_and_order() {
    let outcome = run_with(&NoOverlay);

    assert_eq!(outcome.as_of, as_of());
    let order: Vec<&str> = outcome.reports.iter().map(|r| r.slug.as_str()).collect();
    assert_eq!(order, vec!["inbox", "read", "bike"]);

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].goal, "broken");

    assert_eq!(outcome.stats.goals_evaluated, 3);
    assert_eq!(outcome.stats.goals_failed, 1);
    // read's future point and inbox's pre-activation point
    assert_eq!(outcome.stats.datapoints_ignored, 2);
    assert_eq!(outcome.stats.datapoints_recorded, 12);
}

#[test]
fn test_alerts_diff_against_previous_run() {
    let outcome = run_with(&NoOverlay);
    assert_eq!(outcome.alerts.iter().collect::<Vec<_>>(), vec!["read"]);

    let previous: AlertSet = vec!["bike".to_string()].into_iter().collect();
    let diff = outcome.alerts.diff(&previous);
    assert_eq!(diff.raised, vec!["read".to_string()]);
    assert_eq!(diff.cleared, vec!["bike".to_string()]);
}

#[test]
fn test_blackout_flags_every_goal() {
    let overlay = WarnOverlay::new(
        Vec::new(),
        vec![DateRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 28).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 30).unwrap(),
        }],
    );
    let outcome = run_with(&overlay);

    assert!(outcome.reports.iter().all(|r| r.warn));
    assert_eq!(outcome.alerts.len(), 3);
}

#[test]
fn test_json_outcome_shape() {
    let outcome = run_with(&NoOverlay);
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value["as_of"], "2024-03-29");
    assert_eq!(value["reports"][1]["slug"], "read");
    assert_eq!(value["reports"][1]["rate_of_goal"]["status"], "favorable");
    assert_eq!(value["alerts"], json!(["read"]));
}
