//! # News Aggregator
//!
//! Merges article batches scraped from several sources into one clean,
//! deduplicated dataset, stores it in SQLite, and summarizes it.
//!
//! ## Usage
//!
//! ```sh
//! news_aggregator --process --generate-report
//! ```
//!
//! ## Architecture
//!
//! The application follows a batch pipeline:
//! 1. **Scraping** (optional): external adapters each write one JSON batch
//!    into the raw directory
//! 2. **Processing**: every batch is validated, date-normalized and
//!    deduplicated by link, then written atomically as one dataset
//! 3. **Storage**: the dataset is inserted into SQLite, ignoring known links
//! 4. **Reporting / Export**: summary statistics and copies of the dataset
//!
//! Exit status is non-zero only when a stage cannot produce its output at
//! all. Skipped records and malformed batch files are counted, not fatal.

use clap::{CommandFactory, Parser};
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod analysis;
mod cli;
mod config;
mod error;
mod ingest;
mod models;
mod outputs;
mod scrapers;
mod storage;
mod utils;

use cli::Cli;
use config::{LoggingConfig, Settings};
use ingest::pipeline::{self, Ingested};
use outputs::{json, report};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    let mut settings = config::load_settings(args.config.as_deref())?;
    args.apply_overrides(&mut settings);

    init_tracing(&settings.logging);
    debug!(?settings, "Loaded settings");

    if !args.has_action() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let start_time = std::time::Instant::now();
    info!("news_aggregator starting up");

    run(&args, &settings).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

/// Execute the requested actions in order: scrape, process, report, export.
async fn run(args: &Cli, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let paths = &settings.paths;

    let kinds = args.scrapers();
    if !kinds.is_empty() {
        let results = scrapers::run_scrapers(&kinds, &settings.scrapers, &paths.raw_dir).await;
        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        if failed > 0 {
            warn!(requested = kinds.len(), failed, "Some scrapers did not produce a batch");
        } else {
            info!(requested = kinds.len(), "All scrapers produced a batch");
        }
    }

    if args.process {
        let ingested = process(paths.raw_dir.as_path(), &paths.processed_path, args, settings).await?;
        println!("✅ Processed {}", ingested.report);
    }

    if args.generate_report {
        let articles = json::read_articles(&paths.processed_path).await?;
        let summary = analysis::summarize(&articles, analysis::DEFAULT_TOP_KEYWORDS);
        let written = report::write_report(&paths.reports_dir, &summary).await?;
        for path in written {
            println!("📊 Saved: {}", path.display());
        }
    }

    if args.export {
        let articles = json::read_articles(&paths.processed_path).await?;
        let path = json::export_articles(&paths.exports_dir, &articles).await?;
        println!("📤 Exported {} articles to {}", articles.len(), path.display());
    }

    Ok(())
}

/// Clean the raw directory, then store the result unless `--skip-db`.
///
/// The dataset is written before the database is touched, so a sink
/// failure never costs the primary output.
async fn process(
    raw_dir: &Path,
    output_path: &Path,
    args: &Cli,
    settings: &Settings,
) -> Result<Ingested, Box<dyn Error>> {
    let ingested = pipeline::process_raw_articles(raw_dir, output_path).await?;
    if args.skip_db {
        return Ok(ingested);
    }

    let inserted = pipeline::store_articles(&settings.paths.database, &ingested.articles).await?;
    info!(
        inserted = inserted.inserted,
        ignored = inserted.ignored,
        failed = inserted.failed,
        "Stored processed articles"
    );
    Ok(ingested)
}
