//! Command-line interface definitions for the news aggregator.
//!
//! Each action is a flag; several may be combined in one invocation and
//! always execute in the order scrape, process, report, export.

use crate::config::Settings;
use crate::scrapers::ScraperKind;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Clean and deduplicate everything in the raw directory
/// news_aggregator --process
///
/// # Run the crawler, then process and report in one go
/// news_aggregator --run-crawler --process --generate-report
///
/// # Process a different directory without touching the database
/// news_aggregator --process --raw-dir ./batches --output ./clean.json --skip-db
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a settings YAML file
    #[arg(short, long, env = "NEWS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run the static page scraper
    #[arg(long)]
    pub run_static: bool,

    /// Run the dynamic (browser-rendered) scraper
    #[arg(long)]
    pub run_dynamic: bool,

    /// Run the crawler
    #[arg(long)]
    pub run_crawler: bool,

    /// Clean, deduplicate and store raw batches
    #[arg(short, long)]
    pub process: bool,

    /// Generate the summary report from the cleaned dataset
    #[arg(short = 'r', long)]
    pub generate_report: bool,

    /// Export the cleaned dataset
    #[arg(short, long)]
    pub export: bool,

    /// Do not insert processed articles into the database
    #[arg(long)]
    pub skip_db: bool,

    /// Directory of raw batch files (overrides settings)
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// Output path of the cleaned dataset (overrides settings)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// SQLite database file (overrides settings)
    #[arg(long)]
    pub database: Option<PathBuf>,
}

impl Cli {
    /// Scraper kinds requested by flags, in a fixed order.
    pub fn scrapers(&self) -> Vec<ScraperKind> {
        [
            (self.run_static, ScraperKind::Static),
            (self.run_dynamic, ScraperKind::Dynamic),
            (self.run_crawler, ScraperKind::Crawler),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind))
        .collect()
    }

    /// Whether any action flag was given.
    pub fn has_action(&self) -> bool {
        !self.scrapers().is_empty() || self.process || self.generate_report || self.export
    }

    /// Apply path overrides from the command line.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(ref p) = self.raw_dir {
            settings.paths.raw_dir = p.clone();
        }
        if let Some(ref p) = self.output {
            settings.paths.processed_path = p.clone();
        }
        if let Some(ref p) = self.database {
            settings.paths.database = p.clone();
        }
    }
}
