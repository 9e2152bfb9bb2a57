use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::{clock::local_datetime, time_slot::weekday_name, time_slot::TimeSlot};
use crate::error::Result;

/// Time zone plus the weekly opening hours.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub timezone: String,
    pub opening_hours: Vec<TimeSlot>,
}

impl ScheduleConfig {
    pub fn new(timezone: &str, opening_hours: Vec<TimeSlot>) -> Self {
        Self {
            timezone: timezone.to_string(),
            opening_hours,
        }
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> Result<bool> {
        is_open(now, &self.timezone, &self.opening_hours)
    }
}

/// Return true if `now`, seen from `timezone`, falls inside any of the slots.
///
/// An empty slot list is always closed. Fails only when the time zone is unknown.
pub fn is_open(now: DateTime<Utc>, timezone: &str, slots: &[TimeSlot]) -> Result<bool> {
    let local = local_datetime(now, timezone)?;
    let weekday = weekday_name(local.weekday());
    let (hour, minute) = (local.hour(), local.minute());
    Ok(slots
        .iter()
        .any(|slot| slot.contains(weekday, hour, minute)))
}
