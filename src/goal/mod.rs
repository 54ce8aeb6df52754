//! Goal input for the dashboard engine.
//!
//! This module contains:
//! - Validated goal and datapoint types
//! - Parsing from the Beeminder user document shape

pub mod parse;
pub mod types;

// Re-export commonly used types
pub use parse::{
    as_of_date, as_of_instant, parse_goal, parse_user_data, GoalError, InputError, UserData,
};
pub use types::{Datapoint, Direction, Goal, GoalKind, RateUnit};
