//! Runtime settings loaded from a YAML file.
//!
//! Every section falls back to built-in defaults, so an empty file (or no
//! file at all) yields a working configuration that reads batches from
//! `data_output/raw` and writes everything else under `data_output/`.
//!
//! # Example
//!
//! ```yaml
//! paths:
//!   raw_dir: data_output/raw
//!   processed_path: data_output/processed/cleaned_articles.json
//! logging:
//!   level: debug
//! scrapers:
//!   retries: 3
//!   crawler:
//!     program: scrapy
//!     args: ["crawl", "generic_news_spider"]
//!     output: theverge_articles.json
//! ```

use crate::error::{Error, Result};
use crate::scrapers::ScraperKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings file consulted when no explicit path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/settings.yaml";

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
    pub scrapers: ScrapersConfig,
}

/// Filesystem locations for every stage of the pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding one JSON array of raw records per batch file.
    pub raw_dir: PathBuf,
    /// The cleaned, deduplicated output dataset.
    pub processed_path: PathBuf,
    /// SQLite database file used as the storage sink.
    pub database: PathBuf,
    pub reports_dir: PathBuf,
    pub exports_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data_output/raw"),
            processed_path: PathBuf::from("data_output/processed/cleaned_articles.json"),
            database: PathBuf::from("data_output/news_articles.db"),
            reports_dir: PathBuf::from("data_output/reports"),
            exports_dir: PathBuf::from("data_output/exports"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Source adapter commands and how they are retried.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrapersConfig {
    /// Extra attempts after the first failure of an adapter.
    pub retries: usize,
    /// Initial backoff delay, doubled on every further attempt.
    pub retry_delay_secs: u64,
    /// How many adapters may run at the same time.
    pub parallelism: usize,
    #[serde(rename = "static")]
    pub static_pages: Option<ScraperCommand>,
    pub dynamic: Option<ScraperCommand>,
    pub crawler: Option<ScraperCommand>,
}

impl Default for ScrapersConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_secs: 2,
            parallelism: 3,
            static_pages: None,
            dynamic: None,
            crawler: None,
        }
    }
}

impl ScrapersConfig {
    /// The command configured for `kind`, if any.
    pub fn command_for(&self, kind: ScraperKind) -> Option<&ScraperCommand> {
        match kind {
            ScraperKind::Static => self.static_pages.as_ref(),
            ScraperKind::Dynamic => self.dynamic.as_ref(),
            ScraperKind::Crawler => self.crawler.as_ref(),
        }
    }
}

/// An external program that writes one batch file into the raw directory.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScraperCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// File name of the batch the program leaves in the raw directory.
    pub output: String,
}

/// Parse settings from YAML text. An empty document yields the defaults.
pub fn parse_settings(text: &str) -> Result<Settings> {
    if text.trim().is_empty() {
        return Ok(Settings::default());
    }
    Ok(serde_yaml::from_str(text)?)
}

/// Load settings from an explicit path.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("reading {}: {}", path.display(), e)))?;
    parse_settings(&text).map_err(|e| Error::Config(format!("parsing {}: {}", path.display(), e)))
}

/// Load settings, in order of preference:
/// 1) the explicit `path` (which must exist)
/// 2) `config/settings.yaml` relative to the working directory
/// 3) built-in defaults
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    if let Some(p) = path {
        return load_settings_from(p);
    }
    let fallback = Path::new(DEFAULT_CONFIG_PATH);
    if fallback.exists() {
        return load_settings_from(fallback);
    }
    debug!("No settings file found; using defaults");
    Ok(Settings::default())
}
