//! Lenient timestamp parsing for file-server and catalog values.
//!
//! File servers and metadata sidecars write timestamps in several shapes:
//! RFC 3339 strings, naive `YYYY-MM-DDTHH:MM:SS[.fff]` strings, bare dates,
//! and occasionally epoch milliseconds. Naive values are interpreted as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Timestamp assumed for metadata documents that carry no `last_updated`.
pub const METADATA_FLOOR: &str = "2024-01-01T01:00:00";

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp string in any of the accepted shapes.
///
/// # Examples
///
/// ```
/// use reelsync_common::timestamps::parse_timestamp;
///
/// assert!(parse_timestamp("2024-06-01").is_some());
/// assert!(parse_timestamp("2024-06-01T12:30:00Z").is_some());
/// assert!(parse_timestamp("2024-06-01T12:30:00.250").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a JSON timestamp value: a string in any accepted shape, or an
/// integer number of milliseconds since the Unix epoch.
pub fn parse_timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

/// The floor applied to metadata documents without a `last_updated` field.
pub fn metadata_floor() -> DateTime<Utc> {
    parse_timestamp(METADATA_FLOOR).unwrap_or_default()
}

/// Read `last_updated` from a metadata document.
pub fn last_updated(metadata: &Value) -> Option<DateTime<Utc>> {
    metadata.get("last_updated").and_then(parse_timestamp_value)
}

/// Returns `true` when `candidate` is strictly newer than `current`.
///
/// A missing or unparseable `current` is infinitely stale; a missing
/// `candidate` never wins.
pub fn is_newer(candidate: Option<DateTime<Utc>>, current: Option<DateTime<Utc>>) -> bool {
    match (candidate, current) {
        (Some(candidate), Some(current)) => candidate > current,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
