//! Field-level acceptance test for raw records.

use crate::ingest::dates::normalize_date;
use crate::models::RawRecord;
use serde_json::Value;
use std::fmt;

/// Why a record was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `title` missing, not text, or only whitespace.
    BlankTitle,
    /// `link` missing, not text, or not starting with `http`.
    BadLink,
    /// `published` holds no recognizable calendar date.
    BadDate,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::BlankTitle => "blank title",
            Rejection::BadLink => "bad link",
            Rejection::BadDate => "unparseable date",
        };
        f.write_str(s)
    }
}

/// Check a record, reporting the first failing field.
///
/// `Ok(())` is the acceptance verdict. `category` and `source` are never
/// inspected.
pub fn validate(record: &RawRecord) -> Result<(), Rejection> {
    match record.get("title") {
        Some(Value::String(t)) if !t.trim().is_empty() => {}
        _ => return Err(Rejection::BlankTitle),
    }
    match record.get("link") {
        Some(Value::String(l)) if l.starts_with("http") => {}
        _ => return Err(Rejection::BadLink),
    }
    if normalize_date(record.get("published")).is_none() {
        return Err(Rejection::BadDate);
    }
    Ok(())
}
