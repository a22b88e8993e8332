//! Common types and utilities shared across models.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a timestamp the way every TEXT date column stores it
/// (UTC, millisecond precision, `Z` suffix) so lexical order matches time order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time in storage format
pub fn now_timestamp() -> String {
    format_timestamp(&Utc::now())
}

/// Parse an RFC 3339 timestamp into UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Re-format an RFC 3339 timestamp into storage format, leaving
/// unparseable values untouched (they are rejected earlier by validation)
pub fn normalize_timestamp(value: &str) -> String {
    parse_timestamp(value)
        .map(|dt| format_timestamp(&dt))
        .unwrap_or_else(|| value.to_string())
}
