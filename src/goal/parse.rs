//! Conversion from the Beeminder `users/me.json` document shape.
//!
//! Each goal is validated on its own: a malformed goal produces a
//! [`GoalError`] for that goal while its siblings still parse.

use crate::goal::types::{Datapoint, Direction, Goal, GoalKind, RateUnit};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

/// Day stamp format used by upstream datapoints.
const DAYSTAMP_FORMAT: &str = "%Y%m%d";

/// Errors that make a single goal unusable.
#[derive(Debug, Error)]
pub enum GoalError {
    #[error("goal {goal}: malformed goal document: {source}")]
    Malformed {
        goal: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("goal {goal}: invalid daystamp '{daystamp}'")]
    InvalidDaystamp { goal: String, daystamp: String },
    #[error("goal {goal}: {field} must be -1, 0 or 1 (got {value})")]
    InvalidDirection {
        goal: String,
        field: &'static str,
        value: i64,
    },
    #[error("goal {goal}: unknown rate unit '{unit}'")]
    UnknownRateUnit { goal: String, unit: String },
    #[error("goal {goal}: {field} is not a valid epoch timestamp ({value})")]
    InvalidTimestamp {
        goal: String,
        field: &'static str,
        value: i64,
    },
}

impl GoalError {
    /// Identifier of the goal that failed.
    pub fn goal(&self) -> &str {
        match self {
            GoalError::Malformed { goal, .. }
            | GoalError::InvalidDaystamp { goal, .. }
            | GoalError::InvalidDirection { goal, .. }
            | GoalError::UnknownRateUnit { goal, .. }
            | GoalError::InvalidTimestamp { goal, .. } => goal,
        }
    }
}

/// Errors that make the whole input document unusable.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("input has no `goals` array")]
    MissingGoals,
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),
}

/// A parsed user document: the timezone plus each goal's parse result.
#[derive(Debug)]
pub struct UserData {
    pub timezone: Option<String>,
    pub goals: Vec<Result<Goal, GoalError>>,
}

impl UserData {
    /// Goals that parsed cleanly, in input order.
    pub fn valid_goals(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter().filter_map(|g| g.as_ref().ok())
    }
}

#[derive(Debug, Deserialize)]
struct RawGoal {
    slug: String,
    title: String,
    #[serde(default)]
    goal_type: Option<String>,
    odom: bool,
    aggday: String,
    #[serde(default)]
    rate: Option<f64>,
    #[serde(default)]
    mathishard: Option<Vec<Option<f64>>>,
    runits: String,
    yaw: i64,
    dir: i64,
    initday: i64,
    losedate: i64,
    #[serde(default)]
    datapoints: Vec<RawDatapoint>,
}

#[derive(Debug, Deserialize)]
struct RawDatapoint {
    daystamp: String,
    value: f64,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

/// Parse a whole user document.
pub fn parse_user_data(json: &str) -> Result<UserData, InputError> {
    let document: serde_json::Value = serde_json::from_str(json)?;
    let goals = document
        .get("goals")
        .and_then(|g| g.as_array())
        .ok_or(InputError::MissingGoals)?;

    let timezone = document
        .get("timezone")
        .and_then(|t| t.as_str())
        .map(str::to_string);

    let goals = goals
        .iter()
        .enumerate()
        .map(|(index, value)| parse_goal(value, index))
        .collect();

    Ok(UserData { timezone, goals })
}

/// Parse one goal object. `index` names the goal in errors when it has
/// neither slug nor title.
pub fn parse_goal(value: &serde_json::Value, index: usize) -> Result<Goal, GoalError> {
    let label = value
        .get("slug")
        .or_else(|| value.get("title"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{index}"));

    let raw: RawGoal =
        serde_json::from_value(value.clone()).map_err(|source| GoalError::Malformed {
            goal: label.clone(),
            source,
        })?;

    let yaw = direction_component(&label, "yaw", raw.yaw)?;
    let dir = direction_component(&label, "dir", raw.dir)?;
    // Both components are range-checked above.
    let direction = Direction { yaw, dir };

    let rate_unit =
        RateUnit::from_code(&raw.runits).ok_or_else(|| GoalError::UnknownRateUnit {
            goal: label.clone(),
            unit: raw.runits.clone(),
        })?;

    // The road's current rate is the third "mathishard" element.
    let rate = raw
        .mathishard
        .as_ref()
        .and_then(|m| m.get(2).copied().flatten())
        .or(raw.rate)
        .unwrap_or(0.0);

    let deadline = epoch(&label, "losedate", raw.losedate)?;
    let activation = epoch(&label, "initday", raw.initday)?;

    let datapoints = raw
        .datapoints
        .into_iter()
        .map(|p| -> Result<Datapoint, GoalError> {
            let date = NaiveDate::parse_from_str(&p.daystamp, DAYSTAMP_FORMAT).map_err(|_| {
                GoalError::InvalidDaystamp {
                    goal: label.clone(),
                    daystamp: p.daystamp.clone(),
                }
            })?;
            Ok(Datapoint {
                date,
                value: p.value,
                comment: p.comment,
                id: p.id,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut goal = Goal::new(
        raw.slug,
        raw.title,
        GoalKind::from_flags(raw.odom, &raw.aggday),
        direction,
        rate,
        rate_unit,
        deadline,
        activation,
    )
    .with_datapoints(datapoints);
    goal.goal_type = raw.goal_type;

    Ok(goal)
}

/// Today's date in the named timezone.
pub fn as_of_date(timezone: &str, now: DateTime<Utc>) -> Result<NaiveDate, InputError> {
    let tz = parse_timezone(timezone)?;
    Ok(now.with_timezone(&tz).date_naive())
}

/// The last second of `date` in the named timezone, used as "now" when a
/// run is pinned to a past or future date.
pub fn as_of_instant(timezone: &str, date: NaiveDate) -> Result<DateTime<Utc>, InputError> {
    let tz = parse_timezone(timezone)?;
    let last_second = date
        .and_time(NaiveTime::default())
        .checked_add_signed(chrono::Duration::seconds(86_399))
        .unwrap_or(NaiveDateTime::MAX);

    // A DST gap swallowing the last second falls back to reading it as UTC.
    let instant = tz
        .from_local_datetime(&last_second)
        .latest()
        .unwrap_or_else(|| tz.from_utc_datetime(&last_second));
    Ok(instant.with_timezone(&Utc))
}

fn parse_timezone(timezone: &str) -> Result<Tz, InputError> {
    timezone
        .parse()
        .map_err(|_| InputError::UnknownTimezone(timezone.to_string()))
}

fn direction_component(goal: &str, field: &'static str, value: i64) -> Result<i8, GoalError> {
    if (-1..=1).contains(&value) {
        Ok(value as i8)
    } else {
        Err(GoalError::InvalidDirection {
            goal: goal.to_string(),
            field,
            value,
        })
    }
}

fn epoch(goal: &str, field: &'static str, secs: i64) -> Result<DateTime<Utc>, GoalError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| GoalError::InvalidTimestamp {
        goal: goal.to_string(),
        field,
        value: secs,
    })
}
