//! Run configuration: scheduling constants, the court rule table and the venue timetable.
//!
//! Constants and rules come from one JSON file, the timetable from a CSV with header
//! `court,day_offset,opening,closing,interval`. Everything falls back to the handball defaults.

use crate::logic::CourtRules;
use crate::models::{CourtSchedule, EngineError, DEFAULT_INTERVAL_MINUTES};
use chrono::{NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables of the constraint scheduler.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Minimum minutes between two matches of one team.
    pub rest_minutes: i64,
    #[serde(with = "hhmm")]
    pub lunch_start: NaiveTime,
    /// Exclusive end of the lunch window.
    #[serde(with = "hhmm")]
    pub lunch_end: NaiveTime,
    /// Matches that must fall between a lunch match and the team's next one.
    pub lunch_spacing: usize,
    /// Preferred days, best first. Days not listed come after, in calendar order.
    pub day_order: Vec<Weekday>,
    /// Category codes left out of whole-edition runs.
    pub separately_scheduled: Vec<String>,
    pub default_interval_minutes: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            rest_minutes: 70,
            lunch_start: NaiveTime::from_hms_opt(11, 0, 0).unwrap_or_default(),
            lunch_end: NaiveTime::from_hms_opt(12, 30, 0).unwrap_or_default(),
            lunch_spacing: 3,
            day_order: vec![Weekday::Fri, Weekday::Sat, Weekday::Sun],
            separately_scheduled: vec!["mini".to_string()],
            default_interval_minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }
}

impl SchedulingConfig {
    pub fn is_lunch(&self, time: NaiveDateTime) -> bool {
        let t = time.time();
        t >= self.lunch_start && t < self.lunch_end
    }

    /// Sort key for a day: position in `day_order`, then the remaining weekdays.
    pub fn day_rank(&self, day: Weekday) -> usize {
        match self.day_order.iter().position(|d| *d == day) {
            Some(pos) => pos,
            None => self.day_order.len() + day.num_days_from_monday() as usize,
        }
    }

    pub fn is_scheduled_separately(&self, code: &str) -> bool {
        self.separately_scheduled
            .iter()
            .any(|c| c.eq_ignore_ascii_case(code))
    }
}

/// Everything a scheduling run reads from configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub court_rules: CourtRules,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

#[derive(Deserialize)]
struct TimetableRow {
    court: String,
    day_offset: i64,
    opening: String,
    closing: String,
    interval: Option<u32>,
}

/// Latest timetable day, counted from the tournament start date.
pub const MAX_DAY_OFFSET: i64 = 6;

/// Parse a venue timetable CSV. Rows without an interval use `default_interval`.
/// `day_offset` must lie within `0..=MAX_DAY_OFFSET`.
pub fn read_timetable<R: std::io::Read>(
    reader: R,
    default_interval: u32,
) -> Result<Vec<CourtSchedule>, EngineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rules = Vec::new();
    for row in rdr.deserialize() {
        let row: TimetableRow = row?;
        if !(0..=MAX_DAY_OFFSET).contains(&row.day_offset) {
            return Err(EngineError::Config(format!(
                "court {} has day offset {}, expected 0..={}",
                row.court, row.day_offset, MAX_DAY_OFFSET
            )));
        }
        let opening = parse_hhmm(&row.opening)?;
        let closing = parse_hhmm(&row.closing)?;
        if closing <= opening {
            return Err(EngineError::Config(format!(
                "court {} closes ({}) before it opens ({})",
                row.court, row.closing, row.opening
            )));
        }
        let interval = row.interval.unwrap_or(default_interval);
        if interval == 0 {
            return Err(EngineError::Config(format!(
                "court {} has a zero-minute interval",
                row.court
            )));
        }
        rules.push(CourtSchedule::new(row.court, row.day_offset, opening, closing).with_interval(interval));
    }
    Ok(rules)
}

pub fn load_timetable(
    path: impl AsRef<Path>,
    default_interval: u32,
) -> Result<Vec<CourtSchedule>, EngineError> {
    let file = std::fs::File::open(path)?;
    read_timetable(file, default_interval)
}

/// Accepts "HH:MM" or "HH:MM:SS".
pub fn parse_hhmm(raw: &str) -> Result<NaiveTime, EngineError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| EngineError::Config(format!("invalid time of day: {:?}", raw)))
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}
