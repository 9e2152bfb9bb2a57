use std::fmt::Display;

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TIME_FORMAT;

/// A weekly opening-hours window, `[start, end)` on `day` only.
///
/// Stored as the 5-array `["Thursday", 14, 0, 21, 0]`. `day` stays a raw string and is
/// compared case-sensitively against [`weekday_name`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "(String, u32, u32, u32, u32)",
    into = "(String, u32, u32, u32, u32)"
)]
pub struct TimeSlot {
    day: String,
    start_hour: u32,
    start_minute: u32,
    end_hour: u32,
    end_minute: u32,
}

impl TimeSlot {
    pub fn new(
        day: &str,
        start_hour: u32,
        start_minute: u32,
        end_hour: u32,
        end_minute: u32,
    ) -> Result<Self, String> {
        if start_hour > 23 || end_hour > 23 {
            return Err(format!("Hour out of range in slot for {}.", day));
        }
        if start_minute > 59 || end_minute > 59 {
            return Err(format!("Minute out of range in slot for {}.", day));
        }
        Ok(Self {
            day: day.to_string(),
            start_hour,
            start_minute,
            end_hour,
            end_minute,
        })
    }

    pub fn day(&self) -> &str {
        &self.day
    }

    pub fn start(&self) -> (u32, u32) {
        (self.start_hour, self.start_minute)
    }

    pub fn end(&self) -> (u32, u32) {
        (self.end_hour, self.end_minute)
    }

    /// True if the local wall-clock time `weekday hour:minute` falls inside the slot.
    ///
    /// Tuples compare lexicographically, so this is `start <= now < end`. Zero-width slots
    /// and slots whose end is before their start never match.
    pub fn contains(&self, weekday: &str, hour: u32, minute: u32) -> bool {
        let now = (hour, minute);
        let day_match = weekday == self.day;
        let past_start = now >= self.start();
        let before_end = now < self.end();
        day_match && past_start && before_end
    }
}

impl TryFrom<(String, u32, u32, u32, u32)> for TimeSlot {
    type Error = String;

    fn try_from(value: (String, u32, u32, u32, u32)) -> Result<Self, Self::Error> {
        let (day, start_hour, start_minute, end_hour, end_minute) = value;
        Self::new(&day, start_hour, start_minute, end_hour, end_minute)
    }
}

impl From<TimeSlot> for (String, u32, u32, u32, u32) {
    fn from(slot: TimeSlot) -> Self {
        (
            slot.day,
            slot.start_hour,
            slot.start_minute,
            slot.end_hour,
            slot.end_minute,
        )
    }
}

impl Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:02}:{:02} {:02}:{:02}",
            self.day, self.start_hour, self.start_minute, self.end_hour, self.end_minute
        )
    }
}

/// Full English weekday name, the only naming slot data is matched against.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/**
Parse the opening hours text field, one `Day HH:MM HH:MM` entry per line.

Blank lines are skipped. Entries without exactly three tokens or with a time that does not
parse are dropped.
*/
pub fn parse_opening_hours(text: &str) -> Vec<TimeSlot> {
    let mut opening_hours = Vec::new();
    for entry in text.lines() {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = entry.split_whitespace().collect();
        let &[day, start, end] = tokens.as_slice() else {
            debug!("Skipping opening hours entry '{}': expected 3 tokens", entry);
            continue;
        };
        let (Ok(start), Ok(end)) = (
            NaiveTime::parse_from_str(start, TIME_FORMAT),
            NaiveTime::parse_from_str(end, TIME_FORMAT),
        ) else {
            debug!("Skipping opening hours entry '{}': bad time", entry);
            continue;
        };
        match TimeSlot::new(day, start.hour(), start.minute(), end.hour(), end.minute()) {
            Ok(slot) => opening_hours.push(slot),
            Err(err) => debug!("Skipping opening hours entry '{}': {}", entry, err),
        }
    }
    opening_hours
}

/// Format opening hours back into the text field representation.
pub fn format_opening_hours(opening_hours: &[TimeSlot]) -> String {
    opening_hours
        .iter()
        .map(|slot| slot.to_string())
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thursday() -> TimeSlot {
        TimeSlot::new("Thursday", 14, 0, 21, 0).unwrap()
    }

    #[test]
    fn start_is_inclusive_end_is_exclusive() {
        let slot = thursday();
        assert!(slot.contains("Thursday", 14, 0));
        assert!(slot.contains("Thursday", 20, 59));
        assert!(!slot.contains("Thursday", 21, 0));
        assert!(!slot.contains("Thursday", 13, 59));
    }

    #[test]
    fn minutes_only_matter_on_boundary_hours() {
        let slot = TimeSlot::new("Monday", 9, 30, 11, 15).unwrap();
        assert!(!slot.contains("Monday", 9, 29));
        assert!(slot.contains("Monday", 10, 0));
        assert!(slot.contains("Monday", 10, 59));
        assert!(slot.contains("Monday", 11, 14));
        assert!(!slot.contains("Monday", 11, 15));
    }

    #[test]
    fn day_match_is_case_sensitive() {
        let slot = thursday();
        assert!(!slot.contains("thursday", 15, 0));
        assert!(!slot.contains("Thu", 15, 0));
        assert!(!slot.contains("Wednesday", 15, 0));
    }

    #[test]
    fn zero_width_slot_never_matches() {
        let slot = TimeSlot::new("Friday", 10, 0, 10, 0).unwrap();
        assert!(!slot.contains("Friday", 10, 0));
    }

    #[test]
    fn slot_across_midnight_never_matches() {
        let slot = TimeSlot::new("Saturday", 22, 0, 2, 0).unwrap();
        assert!(!slot.contains("Saturday", 23, 0));
        assert!(!slot.contains("Saturday", 1, 0));
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        assert!(TimeSlot::new("Monday", 24, 0, 1, 0).is_err());
        assert!(TimeSlot::new("Monday", 1, 60, 2, 0).is_err());
        assert!(TimeSlot::new("Monday", 1, 0, 2, 75).is_err());
    }

    #[test]
    fn stored_as_five_array() {
        let json = serde_json::to_string(&thursday()).unwrap();
        assert_eq!(json, r#"["Thursday",14,0,21,0]"#);
        let slot: TimeSlot = serde_json::from_str(r#"["Tuesday",8,5,12,30]"#).unwrap();
        assert_eq!(slot.day(), "Tuesday");
        assert_eq!(slot.start(), (8, 5));
        assert_eq!(slot.end(), (12, 30));
        assert!(serde_json::from_str::<TimeSlot>(r#"["Tuesday",8,5,12]"#).is_err());
        assert!(serde_json::from_str::<TimeSlot>(r#"["Tuesday",25,0,12,0]"#).is_err());
    }

    #[test]
    fn weekday_names_are_full_english() {
        assert_eq!(weekday_name(Weekday::Mon), "Monday");
        assert_eq!(weekday_name(Weekday::Thu), "Thursday");
        assert_eq!(weekday_name(Weekday::Sun), "Sunday");
    }

    #[test]
    fn parse_text_field_drops_malformed_lines() {
        let text = "Thursday 14:00 21:00\n\n  Friday 09:30 12:00  \r\nSaturday 10:00\nSunday ab:cd 12:00\nMonday 08:00 09:00 extra";
        let slots = parse_opening_hours(text);
        assert_eq!(
            slots,
            vec![
                TimeSlot::new("Thursday", 14, 0, 21, 0).unwrap(),
                TimeSlot::new("Friday", 9, 30, 12, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn format_text_field() {
        let slots = vec![thursday(), TimeSlot::new("Friday", 9, 5, 12, 0).unwrap()];
        let text = format_opening_hours(&slots);
        assert_eq!(text, "Thursday 14:00 21:00\nFriday 09:05 12:00");
        assert_eq!(parse_opening_hours(&text), slots);
    }
}
