//! Trend analysis over the cleaned dataset.
//!
//! Computes the figures behind the summary report: category and source
//! distributions, the busiest publishing dates, daily activity with a
//! moving average, and the most frequent title keywords.

use crate::models::CanonicalArticle;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Dates listed in the "top dates" section.
pub const TOP_DATES: usize = 5;
/// Window of the publishing-activity moving average, in entries.
pub const MOVING_AVERAGE_WINDOW: usize = 7;
/// Keywords kept by default.
pub const DEFAULT_TOP_KEYWORDS: usize = 10;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-z]{3,}\b").expect("word pattern compiles"));

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "is", "on", "at", "to", "of", "and", "a", "in", "with", "as", "for", "from", "by",
        "an", "this", "that", "be", "are", "it", "its", "or", "we", "our", "but", "will", "not",
        "has", "have", "was", "you", "they", "about", "how", "who", "what", "when", "why",
        "which", "can", "all", "new", "more", "just", "their", "out",
    ]
    .into_iter()
    .collect()
});

/// Article count for one publishing date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyActivity {
    pub date: String,
    pub count: usize,
    /// Mean of this and the previous six entries; `None` until seven exist.
    pub moving_average: Option<f64>,
}

/// Everything the summary report shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_articles: usize,
    pub by_category: Vec<(String, usize)>,
    pub by_source: Vec<(String, usize)>,
    pub top_dates: Vec<(String, usize)>,
    pub top_keywords: Vec<(String, usize)>,
    pub activity: Vec<DailyActivity>,
}

/// Compute the full summary.
pub fn summarize(articles: &[CanonicalArticle], keyword_limit: usize) -> Summary {
    Summary {
        total_articles: articles.len(),
        by_category: ranked(articles.iter().map(|a| a.category.clone())),
        by_source: ranked(
            articles
                .iter()
                .map(|a| a.source_tag().unwrap_or_else(|| "unknown".to_string())),
        ),
        top_dates: ranked(articles.iter().map(|a| a.published.clone()))
            .into_iter()
            .take(TOP_DATES)
            .collect(),
        top_keywords: top_keywords(articles, keyword_limit),
        activity: publishing_activity(articles),
    }
}

/// The `limit` most frequent non-stopword title words of three or more letters.
pub fn top_keywords(articles: &[CanonicalArticle], limit: usize) -> Vec<(String, usize)> {
    let words = articles.iter().flat_map(|a| {
        let lower = a.title.to_lowercase();
        WORD.find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .filter(|w| !STOPWORDS.contains(w.as_str()))
            .collect::<Vec<_>>()
    });
    ranked(words).into_iter().take(limit).collect()
}

/// Articles per date, oldest first, with a trailing moving average.
pub fn publishing_activity(articles: &[CanonicalArticle]) -> Vec<DailyActivity> {
    let per_day: BTreeMap<&str, usize> = articles
        .iter()
        .map(|a| a.published.as_str())
        .counts()
        .into_iter()
        .collect();
    let counts: Vec<(&str, usize)> = per_day.into_iter().collect();

    counts
        .iter()
        .enumerate()
        .map(|(i, (date, count))| {
            let moving_average = (i + 1 >= MOVING_AVERAGE_WINDOW).then(|| {
                let window = &counts[i + 1 - MOVING_AVERAGE_WINDOW..=i];
                window.iter().map(|(_, c)| *c as f64).sum::<f64>() / MOVING_AVERAGE_WINDOW as f64
            });
            DailyActivity {
                date: date.to_string(),
                count: *count,
                moving_average,
            }
        })
        .collect()
}

/// Count occurrences, most frequent first, ties broken by value.
fn ranked<T, I>(items: I) -> Vec<(T, usize)>
where
    T: Eq + Hash + Ord,
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .counts()
        .into_iter()
        .sorted_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)))
        .collect()
}
