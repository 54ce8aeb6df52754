//! Goal and datapoint types consumed by the aggregation engine.
//!
//! These are the validated, in-memory forms. Parsing from the Beeminder
//! JSON shape lives in [`crate::goal::parse`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single logged observation for a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    /// Day the value counts towards
    pub date: NaiveDate,
    /// Logged value
    pub value: f64,
    /// Free-form comment attached by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Upstream identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Datapoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            comment: None,
            id: None,
        }
    }
}

/// How a goal's logged values collapse into progress over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    /// Independent increments; progress is their sum
    Cumulative,
    /// Absolute running value; progress is the change between the edges
    Endpoint,
    /// Odometer readings that reset to zero
    Odometer,
}

impl GoalKind {
    /// Select the kind from the upstream `odom` and `aggday` fields.
    pub fn from_flags(odometer: bool, aggday: &str) -> Self {
        if odometer {
            GoalKind::Odometer
        } else if aggday == "sum" {
            GoalKind::Cumulative
        } else {
            GoalKind::Endpoint
        }
    }
}

/// Unit of time a goal's rate is expressed per.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
}

impl RateUnit {
    /// Parse the single-letter upstream code (`y`, `m`, `w`, `d`, `h`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "y" => Some(RateUnit::Year),
            "m" => Some(RateUnit::Month),
            "w" => Some(RateUnit::Week),
            "d" => Some(RateUnit::Day),
            "h" => Some(RateUnit::Hour),
            _ => None,
        }
    }

    /// Length of one unit in weeks. Months are four weeks, years 52.
    pub fn weeks(&self) -> f64 {
        match self {
            RateUnit::Year => 52.0,
            RateUnit::Month => 4.0,
            RateUnit::Week => 1.0,
            RateUnit::Day => 1.0 / 7.0,
            RateUnit::Hour => 1.0 / 168.0,
        }
    }
}

/// Signed directionality of a goal.
///
/// `yaw` says which side of the road is good, `dir` which way the road
/// goes. Their product is 1 when growing values are favorable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Direction {
    pub yaw: i8,
    pub dir: i8,
}

impl Direction {
    /// Build a direction, rejecting components outside -1..=1.
    pub fn new(yaw: i8, dir: i8) -> Option<Self> {
        if (-1..=1).contains(&yaw) && (-1..=1).contains(&dir) {
            Some(Self { yaw, dir })
        } else {
            None
        }
    }

    pub fn sign(&self) -> i8 {
        self.yaw * self.dir
    }

    /// "Do more" goals: increasing the tracked value is the favorable way.
    pub fn is_do_more(&self) -> bool {
        self.yaw == self.dir
    }

    pub fn is_do_less(&self) -> bool {
        !self.is_do_more()
    }
}

/// A tracked goal with its datapoints, immutable for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub slug: String,
    pub title: String,
    /// Upstream goal type (hustler, biker, inboxer, ...), used for ordering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<String>,
    pub kind: GoalKind,
    pub direction: Direction,
    /// Target rate per `rate_unit`
    pub rate: f64,
    pub rate_unit: RateUnit,
    /// When the goal derails if nothing is logged
    pub deadline: DateTime<Utc>,
    /// When tracking began
    pub activation: DateTime<Utc>,
    /// Datapoints in chronological order
    datapoints: Vec<Datapoint>,
}

impl Goal {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        kind: GoalKind,
        direction: Direction,
        rate: f64,
        rate_unit: RateUnit,
        deadline: DateTime<Utc>,
        activation: DateTime<Utc>,
    ) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            goal_type: None,
            kind,
            direction,
            rate,
            rate_unit,
            deadline,
            activation,
            datapoints: Vec::new(),
        }
    }

    pub fn with_goal_type(mut self, goal_type: impl Into<String>) -> Self {
        self.goal_type = Some(goal_type.into());
        self
    }

    /// Replace the datapoints, ordering them by date.
    ///
    /// The sort is stable so same-day points keep their logged order.
    pub fn with_datapoints(mut self, mut datapoints: Vec<Datapoint>) -> Self {
        datapoints.sort_by_key(|p| p.date);
        self.datapoints = datapoints;
        self
    }

    pub fn datapoints(&self) -> &[Datapoint] {
        &self.datapoints
    }

    /// Target rate normalized to a per-week figure.
    pub fn weekly_rate(&self) -> f64 {
        self.rate / self.rate_unit.weeks()
    }
}
