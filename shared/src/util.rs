use chrono::{DateTime, SecondsFormat, Utc};

/// Current UTC time
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// RFC 3339 UTC with millisecond precision, e.g. `2025-10-06T04:00:00.000Z`
pub fn iso_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
