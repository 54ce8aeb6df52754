//! Core functionality for the goal dashboard.
//!
//! This module contains:
//! - Aggregation strategies for the different goal kinds
//! - Window management for bucketing datapoints by date
//! - Metric derivation and formatting
//! - Status classification and report building

pub mod aggregation;
pub mod metrics;
pub mod report;
pub mod status;
pub mod windowing;

// Re-export commonly used types
pub use aggregation::AggregationStrategy;
pub use metrics::{format_number, format_percent, percent, DerivedMetrics, NOT_AVAILABLE};
pub use report::{
    render_line, sort_reports, substitute_do_less_symbols, GoalReport, MetricCell, ReportBuilder,
};
pub use status::{
    DateRange, MetricKind, NoOverlay, Overlay, Status, StatusClassifier, WarnOverlay,
};
pub use windowing::{
    AccumulatorSet, GoalAccumulator, IngestCounts, SampleWindows, WindowBucket, WindowDeltas,
};
