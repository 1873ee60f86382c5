//! JSON output for the cleaned dataset and its exports.
//!
//! Every write goes to a hidden sibling temp file first and is then renamed
//! over the target, so readers see either the previous file or the complete
//! new one, never a partial write.

use crate::error::{Error, Result};
use crate::models::CanonicalArticle;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `value` as pretty-printed JSON and atomically replace `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, json.as_bytes()).await
}

/// Atomically replace `path` with `bytes`, creating parent directories.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            return Err(Error::OutputWrite {
                path: path.to_path_buf(),
                source: e,
            });
        }
    }

    let tmp = temp_path_for(path);
    if let Err(e) = fs::write(&tmp, bytes).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(Error::OutputWrite {
            path: path.to_path_buf(),
            source: e,
        });
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(Error::OutputWrite {
            path: path.to_path_buf(),
            source: e,
        });
    }

    info!(path = %path.display(), bytes = bytes.len(), "Wrote file");
    Ok(())
}

/// Write the cleaned dataset.
pub async fn write_articles(path: &Path, articles: &[CanonicalArticle]) -> Result<()> {
    write_json_atomic(path, articles).await
}

/// File name of the JSON export inside the exports directory.
pub const EXPORT_FILE: &str = "articles.json";

/// Copy the cleaned dataset into `exports_dir`.
#[instrument(level = "info", skip_all, fields(exports_dir = %exports_dir.display()))]
pub async fn export_articles(exports_dir: &Path, articles: &[CanonicalArticle]) -> Result<PathBuf> {
    let path = exports_dir.join(EXPORT_FILE);
    write_articles(&path, articles).await?;
    info!(path = %path.display(), count = articles.len(), "Exported articles");
    Ok(path)
}

/// Read a dataset previously written by [`write_articles`].
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_articles(path: &Path) -> Result<Vec<CanonicalArticle>> {
    let text = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&text)?)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
