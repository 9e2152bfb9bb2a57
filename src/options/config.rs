use std::{fs, path::Path};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::{
    error::{Result, ScheduleError},
    table::{
        mask::filter_rows,
        visible::{get_visible_schedule, VisibleSchedule},
    },
    timing::{
        clock::parse_timezone,
        opening_hours::ScheduleConfig,
        time_slot::{parse_opening_hours, TimeSlot},
    },
};

/// The options of the machine schedule.
///
/// Read from a JSON file. Missing fields take the values of [`Default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineScheduleOptions {
    /// Page whose table is served. Negative means no page is configured.
    pub page_id: i64,
    pub machine_names: Vec<String>,
    pub slot_names: Vec<String>,
    pub visible_machines: Vec<bool>,
    pub visible_slots: Vec<bool>,
    #[serde(deserialize_with = "lenient_opening_hours")]
    pub opening_hours: Vec<TimeSlot>,
    pub timezone: String,
}

impl Default for MachineScheduleOptions {
    fn default() -> Self {
        let machine_names = [
            "MakerBot 1",
            "MakerBot 2",
            "RepRap",
            "Small CNC",
            "Big CNC",
            "Laser Cutter",
            "Vinyl Cutter",
        ];
        let slot_names = [
            "13 - 14", "14 - 15", "15 - 16", "16 - 17", "17 - 18", "18 - 19", "19 - 20",
            "20 - 21", "21 - 22",
        ];
        Self {
            page_id: -1,
            visible_machines: vec![true; machine_names.len()],
            visible_slots: vec![true; slot_names.len()],
            machine_names: machine_names.iter().map(|name| name.to_string()).collect(),
            slot_names: slot_names.iter().map(|name| name.to_string()).collect(),
            opening_hours: TimeSlot::new("Thursday", 14, 0, 21, 0).into_iter().collect(),
            timezone: "Europe/Luxembourg".to_string(),
        }
    }
}

impl MachineScheduleOptions {
    pub fn from_config(config: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(config)
            .map_err(|err| ScheduleError::Config(format!("Could not deserialize.\n{}", err)))?;
        options.validate()?;
        Ok(options)
    }

    /// Load the options, or the defaults if the file does not exist yet.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No options at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config = fs::read_to_string(path)?;
        Self::from_config(&config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config = serde_json::to_string_pretty(self)?;
        fs::write(path, config)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Only the time zone is a hard error. Stale masks are allowed through, the filters
    /// ignore them.
    fn validate(&self) -> Result<()> {
        parse_timezone(&self.timezone)?;
        if self.visible_machines.len() != self.machine_names.len() {
            warn!(
                "{} machine names but {} visibility flags",
                self.machine_names.len(),
                self.visible_machines.len()
            );
        }
        if self.visible_slots.len() != self.slot_names.len() {
            warn!(
                "{} slot names but {} visibility flags",
                self.slot_names.len(),
                self.visible_slots.len()
            );
        }
        Ok(())
    }

    pub fn schedule_config(&self) -> ScheduleConfig {
        ScheduleConfig::new(&self.timezone, self.opening_hours.clone())
    }

    pub fn visible_machines(&self) -> Vec<String> {
        filter_rows(&self.machine_names, &self.visible_machines)
    }

    pub fn visible_slots(&self) -> Vec<String> {
        filter_rows(&self.slot_names, &self.visible_slots)
    }

    pub fn visible_schedule(&self, table: &[Vec<bool>]) -> VisibleSchedule {
        get_visible_schedule(
            table,
            &self.machine_names,
            &self.slot_names,
            &self.visible_machines,
            &self.visible_slots,
        )
    }
}

/**
Opening hours are either the text field of the admin form (`"Thursday 14:00 21:00\n..."`) or a
list whose entries are `[day, h, m, h, m]` arrays or single `"Day HH:MM HH:MM"` lines.

Entries that are not well formed are dropped.
*/
fn lenient_opening_hours<'de, D>(deserializer: D) -> std::result::Result<Vec<TimeSlot>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => return Ok(parse_text_entry(&text)),
        serde_json::Value::Array(entries) => entries,
        other => {
            warn!("Dropping opening hours {}: expected a list or text", other);
            return Ok(Vec::new());
        }
    };
    let mut opening_hours = Vec::with_capacity(entries.len());
    for entry in entries {
        if let serde_json::Value::String(text) = &entry {
            opening_hours.extend(parse_text_entry(text));
            continue;
        }
        match serde_json::from_value::<TimeSlot>(entry.clone()) {
            Ok(slot) => opening_hours.push(slot),
            Err(err) => warn!("Dropping opening hours entry {}: {}", entry, err),
        }
    }
    Ok(opening_hours)
}

fn parse_text_entry(text: &str) -> Vec<TimeSlot> {
    let slots = parse_opening_hours(text);
    let lines = text.lines().filter(|line| !line.trim().is_empty()).count();
    if slots.len() < lines {
        warn!(
            "Dropped {} malformed opening hours line(s) from '{}'",
            lines - slots.len(),
            text
        );
    }
    slots
}
