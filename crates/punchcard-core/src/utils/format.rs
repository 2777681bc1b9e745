use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Format a date string as `YYYY/M/D`.
/// Accepts RFC 3339 timestamps, ISO datetimes and plain `YYYY-MM-DD` dates.
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        dt.format("%Y/%-m/%-d").to_string()
    } else if let Some(dt) = parse_naive_datetime(date) {
        dt.format("%Y/%-m/%-d").to_string()
    } else if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        d.format("%Y/%-m/%-d").to_string()
    } else {
        date.to_string()
    }
}

/// Format a timestamp as `YYYY/M/D HH:MM:SS`
pub fn format_datetime(datetime: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(datetime) {
        dt.format("%Y/%-m/%-d %H:%M:%S").to_string()
    } else if let Some(dt) = parse_naive_datetime(datetime) {
        dt.format("%Y/%-m/%-d %H:%M:%S").to_string()
    } else {
        datetime.to_string()
    }
}

/// Format a time of day (`HH:MM[:SS]`) as `HH:MM`
pub fn format_time(time: &str) -> String {
    NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| time.to_string())
}

// The backend writes `isoformat()` datetimes without an offset
fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}
