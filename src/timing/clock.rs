use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::{Result, ScheduleError};

/// Source of "now" for the open access status.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant. Used to pin the status in tests.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| ScheduleError::InvalidTimeZone(name.to_string()))
}

/// Convert an instant to wall-clock time in the named zone.
pub fn local_datetime(now: DateTime<Utc>, timezone: &str) -> Result<DateTime<Tz>> {
    let timezone = parse_timezone(timezone)?;
    Ok(now.with_timezone(&timezone))
}
