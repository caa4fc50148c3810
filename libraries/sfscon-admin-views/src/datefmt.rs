//! Timestamp formatting for table cells and the last-sync line.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::Write;

/// Default display pattern.
pub const DEFAULT_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Format a server timestamp for display.
///
/// A trailing UTC offset (`+01:00`, `-05:00`, `Z`) is dropped and the wall
/// clock time shown as-is. Empty input yields `None`; input that does not
/// look like a timestamp, or a `pattern` chrono cannot render, gives the
/// input back unchanged.
pub fn format_timestamp(value: &str, pattern: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let local = strip_offset(value);

    let parsed = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(local, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(local, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });

    let Some(dt) = parsed else {
        return Some(value.to_string());
    };

    let mut out = String::new();
    match write!(out, "{}", dt.format(pattern)) {
        Ok(()) => Some(out),
        Err(_) => Some(value.to_string()),
    }
}

/// [`format_timestamp`] with [`DEFAULT_PATTERN`].
pub fn format_default(value: &str) -> Option<String> {
    format_timestamp(value, DEFAULT_PATTERN)
}

fn strip_offset(value: &str) -> &str {
    if let Some(rest) = value.strip_suffix('Z') {
        return rest;
    }

    let bytes = value.as_bytes();
    if bytes.len() > 6 {
        let tail = &bytes[bytes.len() - 6..];
        let is_offset = matches!(tail[0], b'+' | b'-')
            && tail[1].is_ascii_digit()
            && tail[2].is_ascii_digit()
            && tail[3] == b':'
            && tail[4].is_ascii_digit()
            && tail[5].is_ascii_digit();
        if is_offset {
            return &value[..value.len() - 6];
        }
    }
    value
}
