//! Data models for raw scraped records and their canonical form.
//!
//! - [`RawRecord`]: an untyped JSON object exactly as a source adapter wrote it
//! - [`CanonicalArticle`]: the validated, typed article written to the output
//!   dataset and the storage sink
//! - [`IngestReport`]: counts describing one ingestion run

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A raw record from a batch file. No field is guaranteed present or typed.
pub type RawRecord = Map<String, Value>;

/// Placeholder for a text field the source did not provide.
pub const MISSING_FIELD: &str = "N/A";

/// Source recorded for articles whose batch did not name one.
pub const MERGED_SOURCE: &str = "merged";

/// A validated news article in canonical form.
///
/// `link` is the natural key: no two articles in one output dataset share
/// it, and the storage sink enforces the same uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CanonicalArticle {
    /// The article headline, as scraped.
    pub title: String,
    /// Absolute URL of the article.
    pub link: String,
    /// Section or tag assigned by the source, or `"N/A"`.
    pub category: String,
    /// Publication date in `YYYY-MM-DD` form.
    pub published: String,
    /// Producing source, or `"merged"` when the batch did not say. Rows in
    /// the storage sink always carry `"merged"`.
    pub source: String,
}

impl CanonicalArticle {
    /// Build the canonical article for a record that already passed validation.
    ///
    /// `published` must be the normalized date. Returns `None` if the record
    /// lacks a text `title` or `link`, which validation rules out.
    pub fn from_accepted(record: &RawRecord, published: String) -> Option<Self> {
        let title = record.get("title")?.as_str()?.to_string();
        let link = record.get("link")?.as_str()?.to_string();
        Some(Self {
            title,
            link,
            category: text_or(record, "category", MISSING_FIELD),
            published,
            source: text_or(record, "source", MERGED_SOURCE),
        })
    }

    /// The same article attributed to the merged ingestion source.
    pub fn merged(self) -> Self {
        Self {
            source: MERGED_SOURCE.to_string(),
            ..self
        }
    }

    /// Extract the domain name (before .com/.org/etc) from the link.
    /// For example: "https://lite.cnn.com/article" -> "cnn"
    pub fn source_tag(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.link).ok()?;
        let host = parsed.host_str()?;
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() >= 2 {
            Some(parts[parts.len() - 2].to_string())
        } else {
            None
        }
    }
}

fn text_or(record: &RawRecord, key: &str, fallback: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

/// Counts for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Articles written to the output dataset.
    pub accepted: usize,
    /// Records dropped because their link was already accepted.
    pub duplicates: usize,
    /// Records dropped for a missing link or failed validation.
    pub invalid: usize,
    /// Batch files that could not be read as an array of records.
    pub skipped_files: usize,
    /// Batch files that were read successfully.
    pub files_read: usize,
}

impl IngestReport {
    /// Every record that did not make it into the output.
    pub fn skipped_records(&self) -> usize {
        self.duplicates + self.invalid
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} articles (skipped {} records, {} files)",
            self.accepted,
            self.skipped_records(),
            self.skipped_files
        )
    }
}
