//! Configuration for the goal dashboard.

use crate::core::status::{
    DateRange, StatusClassifier, WarnOverlay, DEFAULT_DEAD_ZONE_PCT, DEFAULT_NEAR_DEADLINE_SECS,
};
use crate::core::windowing::SampleWindows;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Main configuration for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Length of each sample period in weeks
    pub weeks_per_sample: u32,

    /// Half-width of the neutral band around a metric's centerpoint
    pub dead_zone_pct: f64,

    /// How close a deadline must be to flag the goal
    #[serde(with = "duration_serde", rename = "near_deadline_secs")]
    pub near_deadline: Duration,

    /// Also flag do-less goals that are near their deadline
    pub flag_do_less_deadlines: bool,

    /// Leave goals without an enforced rate off the dashboard
    pub hide_rateless_goals: bool,

    /// Timezone used for "today" when the input names none
    pub default_timezone: String,

    /// Goals always tagged "warn"
    pub warn_goals: Vec<String>,

    /// Date ranges during which every goal is tagged "warn"
    pub blackouts: Vec<DateRange>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weeks_per_sample: 2,
            dead_zone_pct: DEFAULT_DEAD_ZONE_PCT,
            near_deadline: Duration::from_secs(DEFAULT_NEAR_DEADLINE_SECS as u64),
            flag_do_less_deadlines: false,
            hide_rateless_goals: false,
            default_timezone: "UTC".to_string(),
            warn_goals: Vec::new(),
            blackouts: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("beedash")
            .join("config.json")
    }

    /// Sample windows ending at `as_of`.
    pub fn windows(&self, as_of: NaiveDate) -> SampleWindows {
        SampleWindows::new(as_of, self.weeks_per_sample)
    }

    /// Classifier for the configured thresholds. A near-deadline window
    /// beyond chrono's range saturates.
    pub fn classifier(&self) -> StatusClassifier {
        let near_deadline =
            chrono::Duration::from_std(self.near_deadline).unwrap_or(chrono::Duration::MAX);
        StatusClassifier::new(self.dead_zone_pct, near_deadline, self.flag_do_less_deadlines)
    }

    /// Warn overlay from the configured goals and blackouts, plus `extra`
    /// goal slugs supplied at run time.
    pub fn overlay(&self, extra: impl IntoIterator<Item = String>) -> WarnOverlay {
        WarnOverlay::new(
            self.warn_goals.iter().cloned().chain(extra),
            self.blackouts.clone(),
        )
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Serde support for Duration as whole seconds.
mod duration_serde {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        let duration = Duration::from_secs(secs);
        chrono::Duration::from_std(duration)
            .map_err(|_| D::Error::custom(format!("{secs} seconds is out of range")))?;
        Ok(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::Overlay;
    use crate::goal::{Direction, Goal, GoalKind, RateUnit};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.weeks_per_sample, 2);
        assert_eq!(config.dead_zone_pct, 10.0);
        assert_eq!(config.near_deadline, Duration::from_secs(172_800));
        assert!(!config.flag_do_less_deadlines);
        assert!(!config.hide_rateless_goals);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            weeks_per_sample: 3,
            warn_goals: vec!["weight".to_string()],
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"near_deadline_secs": 3600, "blackouts": [{"start": "2024-03-01", "end": "2024-03-05"}]}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.near_deadline, Duration::from_secs(3600));
        assert_eq!(config.weeks_per_sample, 2);
        assert_eq!(config.blackouts.len(), 1);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ nope").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_out_of_range_near_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"near_deadline_secs": 18446744073709551615}"#).unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse(_))
        ));

        // Built in code rather than loaded, the window saturates.
        let config = Config {
            near_deadline: Duration::from_secs(u64::MAX),
            ..Config::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let goal = Goal::new(
            "read",
            "Read",
            GoalKind::Cumulative,
            Direction::new(1, 1).unwrap(),
            1.0,
            RateUnit::Day,
            now + chrono::Duration::days(36_500),
            now,
        );
        assert!(config.classifier().is_near_deadline(&goal, now));
    }

    #[test]
    fn test_overlay_merges_extra_goals() {
        let config = Config {
            warn_goals: vec!["weight".to_string()],
            ..Config::default()
        };
        let overlay = config.overlay(vec!["sleep".to_string()]);
        assert!(overlay.goals.contains("weight"));
        assert!(overlay.goals.contains("sleep"));

        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let goal = Goal::new(
            "sleep",
            "Sleep",
            GoalKind::Endpoint,
            Direction::new(1, 1).unwrap(),
            1.0,
            RateUnit::Day,
            at,
            at,
        );
        assert!(overlay.is_flagged(&goal, at.date_naive()));
    }
}
