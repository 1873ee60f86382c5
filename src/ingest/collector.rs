//! Deduplicating accumulator for one ingestion run.
//!
//! A [`Collector`] owns the set of links accepted so far and the accepted
//! articles in first-seen order. It lives exactly as long as one run; nothing
//! is shared between runs.
//!
//! A record that fails validation does not mark its link as seen, so a later
//! valid record with the same link (in the same or a later batch) is still
//! accepted.

use crate::ingest::dates::normalize_date;
use crate::ingest::validate::{validate, Rejection};
use crate::models::{CanonicalArticle, RawRecord, MISSING_FIELD};
use crate::utils::truncate_for_log;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// What happened to one offered record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    /// The link was already accepted earlier in this run.
    Duplicate,
    /// No usable `link` value at all.
    MissingLink,
    Invalid(Rejection),
}

/// Per-batch outcome counts returned by [`Collector::offer_batch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub accepted: usize,
    pub duplicates: usize,
    pub invalid: usize,
}

#[derive(Debug, Default)]
pub struct Collector {
    seen_links: HashSet<String>,
    accepted: Vec<CanonicalArticle>,
    duplicates: usize,
    invalid: usize,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer one raw record.
    pub fn offer(&mut self, record: RawRecord) -> Outcome {
        match record.get("link") {
            None | Some(Value::Null) => {
                self.invalid += 1;
                return Outcome::MissingLink;
            }
            Some(Value::String(link)) if link.is_empty() => {
                self.invalid += 1;
                return Outcome::MissingLink;
            }
            Some(Value::String(link)) if self.seen_links.contains(link) => {
                self.duplicates += 1;
                return Outcome::Duplicate;
            }
            _ => {}
        }

        if let Err(reason) = validate(&record) {
            debug!(
                title = %truncate_for_log(title_of(&record), 120),
                %reason,
                "Skipping invalid article"
            );
            self.invalid += 1;
            return Outcome::Invalid(reason);
        }

        let article = normalize_date(record.get("published"))
            .and_then(|published| CanonicalArticle::from_accepted(&record, published));
        match article {
            Some(article) => {
                self.seen_links.insert(article.link.clone());
                self.accepted.push(article);
                Outcome::Accepted
            }
            // validate() already guaranteed every field used above
            None => {
                self.invalid += 1;
                Outcome::Invalid(Rejection::BadDate)
            }
        }
    }

    /// Offer every record of one batch, in order.
    pub fn offer_batch(&mut self, records: Vec<RawRecord>) -> BatchTally {
        let mut tally = BatchTally::default();
        for record in records {
            match self.offer(record) {
                Outcome::Accepted => tally.accepted += 1,
                Outcome::Duplicate => tally.duplicates += 1,
                Outcome::MissingLink | Outcome::Invalid(_) => tally.invalid += 1,
            }
        }
        tally
    }

    pub fn accepted(&self) -> &[CanonicalArticle] {
        &self.accepted
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Records rejected for a missing link or failed validation.
    pub fn invalid(&self) -> usize {
        self.invalid
    }

    pub fn into_articles(self) -> Vec<CanonicalArticle> {
        self.accepted
    }
}

fn title_of(record: &RawRecord) -> &str {
    record
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(MISSING_FIELD)
}
