//! Fablab machine schedule.
//!
//! Decides whether the fablab is in open access from a weekly list of opening hours and
//! exposes the machine occupancy table, filtered by the configured visibility masks.
//! The pure parts live in `timing` and `table`; `options`, `database`, `server` and `client`
//! wire them to a JSON options file, SQLite and HTTP.

pub mod client;
pub mod database;
pub mod error;
pub mod options;
pub mod server;
pub mod table;
pub mod timing;

pub use error::{Result, ScheduleError};
pub use table::visible::{get_visible_schedule, OccupancyTable, VisibleSchedule};
pub use timing::opening_hours::{is_open, ScheduleConfig};
pub use timing::time_slot::TimeSlot;

pub const API_BASE: &str = "/open-access/v1";
pub const TIME_FORMAT: &str = "%H:%M";
