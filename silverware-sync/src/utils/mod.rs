pub mod logger;
pub mod time;

pub use time::{WeekWindow, current_week_start, parse_week_start, week_id, week_window};
