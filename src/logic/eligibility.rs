//! Court eligibility: which courts (and days) each category may be scheduled on.

use chrono::Weekday;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One allowed court for a category.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CourtRule {
    pub court: String,
    /// None means every day.
    #[serde(default)]
    pub days: Option<Vec<Weekday>>,
    #[serde(default)]
    pub primary: bool,
}

impl CourtRule {
    pub fn any_day(court: impl Into<String>, primary: bool) -> Self {
        Self {
            court: court.into(),
            days: None,
            primary,
        }
    }

    pub fn on_days(court: impl Into<String>, days: Vec<Weekday>, primary: bool) -> Self {
        Self {
            court: court.into(),
            days: Some(days),
            primary,
        }
    }

    fn matches(&self, court: &str, day: Weekday) -> bool {
        self.court == court && self.days.as_ref().map_or(true, |days| days.contains(&day))
    }
}

/// Category code -> ordered court rules. Loaded once per run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourtRules {
    categories: HashMap<String, Vec<CourtRule>>,
}

impl CourtRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, rules: Vec<CourtRule>) {
        self.categories.insert(code.into(), rules);
    }

    /// Builder form of [`CourtRules::insert`].
    pub fn with(mut self, code: impl Into<String>, rules: Vec<CourtRule>) -> Self {
        self.insert(code, rules);
        self
    }

    pub fn rules_for(&self, code: &str) -> Option<&[CourtRule]> {
        self.categories.get(code).map(Vec::as_slice)
    }

    /// A category without rules cannot be scheduled anywhere.
    pub fn has_rules(&self, code: &str) -> bool {
        self.rules_for(code).is_some_and(|r| !r.is_empty())
    }

    /// True iff some rule of the category names this court and allows this day.
    pub fn allows(&self, code: &str, court: &str, day: Weekday) -> bool {
        match self.rules_for(code) {
            Some(rules) => rules.iter().any(|r| r.matches(court, day)),
            None => {
                warn!("Category {} has no court rules; refusing court {}", code, court);
                false
            }
        }
    }

    pub fn is_primary(&self, code: &str, court: &str) -> bool {
        self.rules_for(code)
            .is_some_and(|rules| rules.iter().any(|r| r.primary && r.court == court))
    }
}
