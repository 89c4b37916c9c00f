//! Week window helpers
//!
//! A week is identified by its Monday (`YYYY-MM-DD`). The window boundaries are
//! local midnights converted to UTC with a fixed minute offset.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::config::ConfigError;

/// `[start, end)` UTC instants of one week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Parse a week start date string (YYYY-MM-DD)
pub fn parse_week_start(date: &str) -> Result<NaiveDate, ConfigError> {
    let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|e| {
        ConfigError::Invalid {
            name: "week",
            value: date.to_string(),
            reason: e.to_string(),
        }
    })?;
    if parsed.weekday().number_from_monday() != 1 {
        tracing::warn!(week = %parsed, weekday = %parsed.weekday(), "Week start is not a Monday, using it as given");
    }
    Ok(parsed)
}

/// Monday of the week containing `today`
pub fn week_start_of(today: NaiveDate) -> NaiveDate {
    let back = i64::from(today.weekday().num_days_from_monday());
    today - Duration::days(back)
}

/// Monday of the current week, in UTC calendar terms
pub fn current_week_start() -> NaiveDate {
    week_start_of(Utc::now().date_naive())
}

/// Week window for `week_start` with local midnight at `tz_offset_minutes` from UTC
///
/// A negative offset (west of UTC) moves the boundaries later in UTC.
pub fn week_window(week_start: NaiveDate, tz_offset_minutes: i32) -> WeekWindow {
    let start = week_start.and_time(chrono::NaiveTime::MIN).and_utc()
        - Duration::minutes(i64::from(tz_offset_minutes));
    WeekWindow {
        start,
        end: start + Duration::days(7),
    }
}

/// Week identifier used in document paths
pub fn week_id(week_start: NaiveDate) -> String {
    week_start.format("%Y-%m-%d").to_string()
}
