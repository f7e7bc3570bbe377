//! Timestamp normalization to UTC ISO-8601 with a `Z` suffix

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::sheet::CellValue;

/// Formats tried for text carrying an explicit offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Formats tried for text without an offset; read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a cell as a point in time. Values without a zone are taken as UTC.
pub fn parse_timestamp(value: &CellValue) -> Result<DateTime<Utc>, String> {
    match value {
        CellValue::DateTime(naive) => Ok(naive.and_utc()),
        CellValue::String(s) => parse_text(s.trim()),
        CellValue::Null => Err("timestamp is empty".to_string()),
        other => Err(format!("'{}' is not a timestamp", other)),
    }
}

/// Render as ISO-8601 UTC with a literal `Z`; fractional seconds only when present
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse and render in one step
pub fn normalize_timestamp(value: &CellValue) -> Result<String, String> {
    parse_timestamp(value).map(|dt| format_timestamp(&dt))
}

fn parse_text(s: &str) -> Result<DateTime<Utc>, String> {
    if s.is_empty() {
        return Err("timestamp is empty".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc());
            }
        }
    }

    Err(format!("'{}' is not a recognized timestamp", s))
}
