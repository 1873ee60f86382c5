//! Error types for the aggregator.
//!
//! Only conditions that stop a stage from producing output live here.
//! Rejected records, malformed batch files and single failed row inserts
//! are counted and logged where they happen instead.

use crate::scrapers::ScraperKind;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the aggregator
#[derive(Error, Debug)]
pub enum Error {
    /// Settings file missing, unreadable or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// The raw batch directory cannot be listed
    #[error("Cannot read raw directory {}: {source}", path.display())]
    RawDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be written or moved into place
    #[error("Failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding errors
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Database connection or transaction errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A source adapter did not produce its batch
    #[error("Scraper '{kind}' failed: {reason}")]
    Scraper { kind: ScraperKind, reason: String },

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using the aggregator Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Config(e.to_string())
    }
}
