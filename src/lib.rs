//! Beedash - trend dashboard engine for Beeminder-style tracked goals.
//!
//! For each goal this library computes today's progress, a rolling weekly
//! average, the goal's required weekly rate, how the average compares with
//! that rate, and how the current period compares with the one before it.
//! Each figure is then classified as favorable, unfavorable or neutral with
//! the goal's direction in mind.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Beedash                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │    Goal     │──▶│  Windowing  │──▶│   Metrics   │        │
//! │  │   (parse)   │   │ (aggregate) │   │  (derive)   │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │                                             │               │
//! │                                             ▼               │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │   Alerts    │◀──│   Report    │◀──│   Status    │        │
//! │  │   (diff)    │   │  (records)  │   │ (classify)  │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use beedash::{parse_user_data, Config, Engine, NoOverlay};
//! use chrono::{NaiveDate, Utc};
//!
//! let json = std::fs::read_to_string("me.json").expect("read input");
//! let data = parse_user_data(&json).expect("parse input");
//!
//! let as_of = NaiveDate::from_ymd_opt(2024, 3, 29).unwrap();
//! let engine = Engine::from_config(&Config::default(), as_of);
//! let outcome = engine.run(&data.goals, &NoOverlay, Utc::now());
//!
//! for report in &outcome.reports {
//!     println!("{}", beedash::render_line(report));
//! }
//! ```

pub mod alerts;
pub mod config;
pub mod core;
pub mod engine;
pub mod goal;
pub mod stats;

// Re-export key types at crate root for convenience
pub use alerts::{AlertDiff, AlertSet};
pub use config::{Config, ConfigError};
pub use crate::core::{
    render_line, sort_reports, AccumulatorSet, AggregationStrategy, DerivedMetrics, GoalReport,
    MetricCell, NoOverlay, Overlay, SampleWindows, Status, StatusClassifier, WarnOverlay,
    WindowBucket,
};
pub use engine::{Engine, GoalFailure, RunOutcome};
pub use goal::{
    as_of_date, as_of_instant, parse_user_data, Datapoint, Direction, Goal, GoalError, GoalKind,
    InputError, RateUnit, UserData,
};
pub use stats::{RunLog, RunStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Legend explaining the dashboard's columns and symbols.
pub const LEGEND: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                        BEEDASH - LEGEND                          ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  Each line reads:                                                ║
║    <today> today <weekly> weekly vs <rate> (<pct> of goal,       ║
║    <change> w/w) <title>                                         ║
║                                                                  ║
║    • today    progress logged today                              ║
║    • weekly   average weekly progress over the sample period     ║
║    • rate     weekly rate the goal requires                      ║
║    • of goal  weekly average as a share of the required rate     ║
║    • w/w      change against the preceding sample period         ║
║                                                                  ║
║  Symbols:                                                        ║
║    +/-        do-more goals: bigger magnitudes are better        ║
║    ▲/▼        do-less goals: smaller magnitudes are better       ║
║    N/A        no rate or no baseline to compare against          ║
║    [eep]      the goal derails within two days                   ║
║    [warn]     flagged by your warn list or a blackout range      ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_contents() {
        assert!(LEGEND.contains("LEGEND"));
        assert!(LEGEND.contains("w/w"));
        assert!(LEGEND.contains("do-less goals"));
    }
}
