//! Alert sets for the notification layer.
//!
//! An [`AlertSet`] holds the slugs of goals that are near their deadline
//! or tagged by the warn overlay. Diffing it against the previous run's set
//! tells a notifier what changed. Storing the previous set is the caller's
//! job.

use crate::core::GoalReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Goal slugs currently alerting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertSet {
    slugs: BTreeSet<String>,
}

impl AlertSet {
    /// Collect the alerting goals from a batch of reports.
    pub fn from_reports<'a>(reports: impl IntoIterator<Item = &'a GoalReport>) -> Self {
        reports
            .into_iter()
            .filter(|r| r.is_alerting())
            .map(|r| r.slug.clone())
            .collect()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.slugs.contains(slug)
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.slugs.iter().map(String::as_str)
    }

    /// What changed since `previous`.
    pub fn diff(&self, previous: &AlertSet) -> AlertDiff {
        AlertDiff {
            raised: self.slugs.difference(&previous.slugs).cloned().collect(),
            cleared: previous.slugs.difference(&self.slugs).cloned().collect(),
        }
    }
}

impl FromIterator<String> for AlertSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            slugs: iter.into_iter().collect(),
        }
    }
}

/// Change between two alert sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDiff {
    /// Alerting now but not before
    pub raised: Vec<String>,
    /// Alerting before but not now
    pub cleared: Vec<String>,
}

impl AlertDiff {
    pub fn is_empty(&self) -> bool {
        self.raised.is_empty() && self.cleared.is_empty()
    }

    /// Short human message, or `None` when nothing changed.
    pub fn message(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut parts = Vec::new();
        if !self.raised.is_empty() {
            parts.push(format!("New eep: {}", self.raised.join(", ")));
        }
        if !self.cleared.is_empty() {
            parts.push(format!("Adios: {}", self.cleared.join(", ")));
        }
        Some(parts.join("\n"))
    }
}
