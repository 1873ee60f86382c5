//! Source adapters that produce raw batch files.
//!
//! Scraping itself happens outside this crate. Each adapter kind maps to a
//! configured external program; the pipeline only ever sees the finished
//! batch file the program leaves in the raw directory.
//!
//! # Adapter Kinds
//!
//! | Kind | Flag | Typical producer |
//! |------|------|------------------|
//! | `static` | `--run-static` | HTTP fetch + HTML parsing |
//! | `dynamic` | `--run-dynamic` | headless browser |
//! | `crawler` | `--run-crawler` | site crawler |
//!
//! Requested adapters run concurrently (bounded by `scrapers.parallelism`).
//! A failing adapter is retried with backoff, then logged; it never stops
//! the remaining adapters.

pub mod command;
pub mod retry;

use crate::config::ScrapersConfig;
use crate::error::{Error, Result};
use command::CommandSource;
use futures::stream::{self, StreamExt};
use retry::Retrying;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, instrument};

/// The closed set of source adapter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScraperKind {
    Static,
    Dynamic,
    Crawler,
}

impl fmt::Display for ScraperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScraperKind::Static => "static",
            ScraperKind::Dynamic => "dynamic",
            ScraperKind::Crawler => "crawler",
        };
        f.write_str(s)
    }
}

/// Anything that can produce one batch file in the raw directory.
pub trait BatchSource {
    fn kind(&self) -> ScraperKind;

    /// Run the adapter and return the path of the batch it wrote.
    async fn produce_batch(&self, raw_dir: &Path) -> Result<PathBuf>;
}

/// Build the retrying command adapter configured for `kind`.
pub fn build_source(kind: ScraperKind, config: &ScrapersConfig) -> Result<Retrying<CommandSource>> {
    let command = config
        .command_for(kind)
        .cloned()
        .ok_or_else(|| Error::Config(format!("no command configured for the {} scraper", kind)))?;
    Ok(Retrying::new(
        CommandSource::new(kind, command),
        config.retries,
        Duration::from_secs(config.retry_delay_secs),
    ))
}

/// Run every requested adapter and collect per-kind outcomes.
///
/// Results are returned in the order `kinds` was given.
#[instrument(level = "info", skip_all, fields(raw_dir = %raw_dir.display()))]
pub async fn run_scrapers(
    kinds: &[ScraperKind],
    config: &ScrapersConfig,
    raw_dir: &Path,
) -> Vec<(ScraperKind, Result<PathBuf>)> {
    let parallelism = config.parallelism.max(1);
    info!(?kinds, parallelism, "Running scrapers");

    let mut results: Vec<(usize, ScraperKind, Result<PathBuf>)> = stream::iter(kinds.iter().copied().enumerate())
        .map(|(i, kind)| async move {
            let outcome = match build_source(kind, config) {
                Ok(source) => source.produce_batch(raw_dir).await,
                Err(e) => Err(e),
            };
            if let Err(ref e) = outcome {
                error!(%kind, error = %e, "Scraper failed; continuing without its batch");
            }
            (i, kind, outcome)
        })
        .buffer_unordered(parallelism)
        .collect()
        .await;

    results.sort_by_key(|(i, _, _)| *i);
    results.into_iter().map(|(_, kind, r)| (kind, r)).collect()
}
