//! Source adapter backed by an external scraping program.
//!
//! The program is expected to write exactly one batch file (a JSON array of
//! raw records) into the raw directory, under the name given by
//! [`ScraperCommand::output`]. The raw directory is passed to it in the
//! `NEWS_RAW_DIR` environment variable.

use crate::config::ScraperCommand;
use crate::error::{Error, Result};
use crate::scrapers::{BatchSource, ScraperKind};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Environment variable carrying the raw directory to the scraper.
pub const RAW_DIR_ENV: &str = "NEWS_RAW_DIR";

#[derive(Debug, Clone)]
pub struct CommandSource {
    kind: ScraperKind,
    command: ScraperCommand,
}

impl CommandSource {
    pub fn new(kind: ScraperKind, command: ScraperCommand) -> Self {
        Self { kind, command }
    }

    fn failure(&self, reason: impl Into<String>) -> Error {
        Error::Scraper {
            kind: self.kind,
            reason: reason.into(),
        }
    }
}

impl BatchSource for CommandSource {
    fn kind(&self) -> ScraperKind {
        self.kind
    }

    #[instrument(level = "info", skip_all, fields(kind = %self.kind, program = %self.command.program))]
    async fn produce_batch(&self, raw_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(raw_dir).await?;
        debug!(args = ?self.command.args, "Launching scraper");

        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .env(RAW_DIR_ENV, raw_dir)
            .output()
            .await
            .map_err(|e| self.failure(format!("could not start {}: {}", self.command.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(format!(
                "{} exited with {}: {}",
                self.command.program,
                output.status,
                stderr.trim()
            )));
        }

        let batch = raw_dir.join(&self.command.output);
        if !tokio::fs::try_exists(&batch).await.unwrap_or(false) {
            return Err(self.failure(format!("expected batch {} was not written", batch.display())));
        }

        info!(batch = %batch.display(), "Scraper produced batch");
        Ok(batch)
    }
}
