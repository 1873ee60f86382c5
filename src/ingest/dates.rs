//! Best-effort extraction of a publication date from free-form text.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Four digits, two digits, two digits, each pair joined by `-` or `/`.
static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}[-/]\d{2}[-/]\d{2}").expect("date pattern compiles"));

/// Normalize a raw `published` value into `YYYY-MM-DD`.
///
/// Non-text values (numbers, null, a missing field) yield `None`.
pub fn normalize_date(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => normalize_date_str(s),
        _ => None,
    }
}

/// Find the first `YYYY-MM-DD` or `YYYY/MM/DD` substring and re-emit it as
/// `YYYY-MM-DD`.
///
/// Only the first match is considered. If that match is not a real calendar
/// date (month 13, February 30, mixed separators) the result is `None`, even
/// when a later substring would have parsed.
///
/// ```ignore
/// assert_eq!(normalize_date_str("2025/06/22 extra text"), Some("2025-06-22".into()));
/// assert_eq!(normalize_date_str("invalid-date"), None);
/// ```
pub fn normalize_date_str(text: &str) -> Option<String> {
    let found = DATE_PATTERN.find(text)?.as_str();
    let format = if found.contains('-') {
        "%Y-%m-%d"
    } else {
        "%Y/%m/%d"
    };
    NaiveDate::parse_from_str(found, format)
        .ok()
        // year 0 is not a calendar year
        .filter(|d| d.year() >= 1)
        .map(|d| d.format("%Y-%m-%d").to_string())
}
