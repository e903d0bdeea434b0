//! Timestamp parsing for record cells.
//!
//! Cells that cannot be parsed are treated as missing, never as errors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Formats tried, in order, when parsing record timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFormatConfig {
    /// Date-and-time formats
    pub datetime_formats: Vec<String>,
    /// Date-only formats; a parsed date is taken at midnight
    pub date_formats: Vec<String>,
    /// Retry the date formats on the leading date part when nothing matched
    pub date_part_fallback: bool,
}

impl Default for TimestampFormatConfig {
    fn default() -> Self {
        Self {
            datetime_formats: vec![
                "%Y-%m-%d %H:%M:%S".to_string(),    // 2023-01-15 14:30:00
                "%Y-%m-%dT%H:%M:%S".to_string(),    // 2023-01-15T14:30:00
                "%Y-%m-%d %H:%M:%S%.f".to_string(), // 2023-01-15 14:30:00.000
                "%Y-%m-%dT%H:%M:%S%.f".to_string(),
                "%Y-%m-%d %H:%M".to_string(),
                "%d/%m/%Y %H:%M:%S".to_string(), // 15/01/2023 14:30:00
                "%d/%m/%Y %H:%M".to_string(),
                "%d-%m-%Y %H:%M:%S".to_string(),
                "%d-%m-%Y %H:%M".to_string(),
            ],
            date_formats: vec![
                "%Y-%m-%d".to_string(), // ISO format: 2023-01-15
                // %Y would read "23" as year 23, so the short year goes first
                "%d/%m/%y".to_string(), // 15/01/23
                "%d/%m/%Y".to_string(), // Brazilian: 15/01/2023
                "%d-%m-%Y".to_string(), // 15-01-2023
                "%d.%m.%Y".to_string(), // 15.01.2023
                "%Y/%m/%d".to_string(), // 2023/01/15
                "%Y%m%d".to_string(),   // Compact: 20230115
            ],
            date_part_fallback: true,
        }
    }
}

/// Parse a timestamp cell with multiple format attempts
#[must_use]
pub fn parse_timestamp(s: &str, config: &TimestampFormatConfig) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for format in &config.datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    if let Some(dt) = parse_date(s, config) {
        return Some(dt);
    }

    if config.date_part_fallback {
        // A trailing time in an unknown layout is dropped
        let date_part = s.split([' ', 'T']).next().unwrap_or(s);
        if date_part != s {
            return parse_date(date_part, config);
        }
    }

    None
}

fn parse_date(s: &str, config: &TimestampFormatConfig) -> Option<NaiveDateTime> {
    config
        .date_formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Whole days from `start` to `end`, rounded towards negative infinity
#[must_use]
pub fn days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_seconds().div_euclid(86_400)
}
