pub mod clock;
pub mod opening_hours;
pub mod time_slot;
