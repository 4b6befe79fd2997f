//! Venue timetable rules and the (time, court) slots expanded from them.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Default length of one slot, in minutes.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 35;

/// Opening hours of one court on one tournament day.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CourtSchedule {
    pub court: String,
    /// Days after the tournament start date (0 = first day).
    pub day_offset: i64,
    pub opening: NaiveTime,
    pub closing: NaiveTime,
    pub interval_minutes: u32,
}

impl CourtSchedule {
    pub fn new(court: impl Into<String>, day_offset: i64, opening: NaiveTime, closing: NaiveTime) -> Self {
        Self {
            court: court.into(),
            day_offset,
            opening,
            closing,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }

    pub fn with_interval(mut self, minutes: u32) -> Self {
        self.interval_minutes = minutes;
        self
    }
}

/// A bookable (time, court) unit.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub time: NaiveDateTime,
    pub court: String,
}

impl Slot {
    pub fn new(time: NaiveDateTime, court: impl Into<String>) -> Self {
        Self {
            time,
            court: court.into(),
        }
    }

    pub fn weekday(&self) -> Weekday {
        self.time.weekday()
    }
}
