//! Batch ingestion: raw directory in, one cleaned dataset out.
//!
//! # Flow
//!
//! 1. List `*.json` files in the raw directory, sorted by file name
//! 2. Parse each as an array of raw records; a file that does not parse is
//!    skipped and counted, never fatal
//! 3. Offer every record to a [`Collector`] owned by this run
//! 4. Log the summary, then atomically write the accepted articles
//!
//! [`store_articles`] then hands the written articles to the SQLite sink.
//! The sink is a secondary output: it runs only after the dataset exists.

use crate::error::{Error, Result};
use crate::ingest::collector::Collector;
use crate::models::{CanonicalArticle, IngestReport, RawRecord};
use crate::outputs::json::write_articles;
use crate::storage::{ArticleStore, InsertReport};
use crate::utils::looks_truncated;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Result of one ingestion run.
#[derive(Debug)]
pub struct Ingested {
    pub articles: Vec<CanonicalArticle>,
    pub report: IngestReport,
}

/// List batch files in stable (lexical file name) order.
///
/// A batch is any entry whose name ends in `.json` and that resolves to a
/// regular file; symlinks are followed.
pub async fn list_batch_files(raw_dir: &Path) -> Result<Vec<PathBuf>> {
    let raw_dir_err = |source| Error::RawDir {
        path: raw_dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(raw_dir).await.map_err(raw_dir_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(raw_dir_err)? {
        let path = entry.path();
        if !entry.file_name().to_string_lossy().ends_with(".json") {
            continue;
        }
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => files.push(path),
            Ok(_) => debug!(file = %path.display(), "Ignoring non-file entry"),
            Err(e) => {
                // dangling symlink or vanished entry; read_batch reports it
                debug!(file = %path.display(), error = %e, "Batch entry has no metadata");
                files.push(path);
            }
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read one batch file. `None` means the file is unusable and was skipped.
#[instrument(level = "debug", skip_all, fields(file = %path.display()))]
async fn read_batch(path: &Path) -> Option<Vec<RawRecord>> {
    let text = match fs::read_to_string(path).await {
        Ok(t) => t,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Skipping unreadable batch file");
            return None;
        }
    };
    match serde_json::from_str::<Vec<RawRecord>>(&text) {
        Ok(records) => {
            debug!(file = %path.display(), count = records.len(), "Articles found in batch");
            Some(records)
        }
        Err(e) if looks_truncated(&e) => {
            warn!(file = %path.display(), error = %e, "Skipping batch file: JSON ends early (truncated?)");
            None
        }
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Skipping batch file: invalid JSON");
            None
        }
    }
}

/// Run every batch in `raw_dir` through a fresh [`Collector`].
///
/// Fails only if the directory itself cannot be listed.
#[instrument(level = "info", skip_all, fields(raw_dir = %raw_dir.display()))]
pub async fn collect_raw_articles(raw_dir: &Path) -> Result<Ingested> {
    let mut collector = Collector::new();
    let mut report = IngestReport::default();

    for path in list_batch_files(raw_dir).await? {
        match read_batch(&path).await {
            Some(records) => {
                report.files_read += 1;
                let tally = collector.offer_batch(records);
                debug!(
                    file = %path.display(),
                    accepted = tally.accepted,
                    duplicates = tally.duplicates,
                    invalid = tally.invalid,
                    "Batch collected"
                );
            }
            None => report.skipped_files += 1,
        }
    }

    report.duplicates = collector.duplicates();
    report.invalid = collector.invalid();
    report.accepted = collector.accepted().len();
    let articles = collector.into_articles();

    Ok(Ingested { articles, report })
}

/// Clean every batch in `raw_dir` and write the result to `output_path`.
///
/// The summary is logged before the write so it is reported even when the
/// write fails.
#[instrument(level = "info", skip_all, fields(raw_dir = %raw_dir.display(), output = %output_path.display()))]
pub async fn process_raw_articles(raw_dir: &Path, output_path: &Path) -> Result<Ingested> {
    info!("Starting raw article processing");
    let ingested = collect_raw_articles(raw_dir).await?;
    let r = &ingested.report;

    info!(
        accepted = r.accepted,
        skipped_records = r.skipped_records(),
        duplicates = r.duplicates,
        invalid = r.invalid,
        skipped_files = r.skipped_files,
        files_read = r.files_read,
        "Raw article processing summary"
    );
    if r.skipped_files > 0 {
        warn!(skipped_files = r.skipped_files, "Some batch files were skipped");
    }

    write_articles(output_path, &ingested.articles).await?;
    info!(
        count = ingested.articles.len(),
        path = %output_path.display(),
        "Cleaned unique valid articles saved"
    );
    Ok(ingested)
}

/// Insert already-written articles into the SQLite database at `database`.
///
/// Every row is stored with the `"merged"` source, since one run merges
/// batches from several adapters.
#[instrument(level = "info", skip_all, fields(database = %database.display(), count = articles.len()))]
pub async fn store_articles(database: &Path, articles: &[CanonicalArticle]) -> Result<InsertReport> {
    let store = ArticleStore::open(database).await?;
    store.ensure_schema().await?;
    let rows: Vec<CanonicalArticle> = articles.iter().cloned().map(CanonicalArticle::merged).collect();
    let inserted = store.insert_or_ignore(&rows).await;
    store.close().await;
    inserted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs as stdfs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            stdfs::create_dir_all(dir.path().join("raw")).unwrap();
            Self { dir }
        }

        fn raw(&self) -> PathBuf {
            self.dir.path().join("raw")
        }

        fn output(&self) -> PathBuf {
            self.dir.path().join("processed").join("cleaned_articles.json")
        }

        fn batch(&self, name: &str, records: Value) {
            stdfs::write(self.raw().join(name), records.to_string()).unwrap();
        }

        fn batch_text(&self, name: &str, text: &str) {
            stdfs::write(self.raw().join(name), text).unwrap();
        }

        fn read_output(&self) -> Vec<Value> {
            let text = stdfs::read_to_string(self.output()).unwrap();
            serde_json::from_str(&text).unwrap()
        }
    }

    #[tokio::test]
    async fn duplicate_with_bad_date_is_dropped() {
        let fx = Fixture::new();
        fx.batch(
            "aj.json",
            json!([
                {
                    "title": "Integration Article",
                    "link": "http://test.com/integration-1",
                    "published": "2025-06-17",
                    "category": "test",
                },
                {
                    "title": "Duplicate Article",
                    "link": "http://test.com/integration-1",
                    "published": "invalid-date",
                    "category": "test",
                },
            ]),
        );

        let ingested = process_raw_articles(&fx.raw(), &fx.output()).await.unwrap();
        assert_eq!(ingested.report.accepted, 1);
        assert_eq!(ingested.report.skipped_records(), 1);

        let out = fx.read_output();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["title"], "Integration Article");
        assert_eq!(out[0]["published"], "2025-06-17");
    }

    #[tokio::test]
    async fn malformed_file_is_skipped_and_run_completes() {
        let fx = Fixture::new();
        fx.batch_text("broken.json", "[{\"title\": \"oops\",");
        fx.batch_text("not_an_array.json", "{\"title\": \"object\"}");
        fx.batch(
            "good.json",
            json!([{"title": "Good", "link": "https://ok.com/1", "published": "2025/06/22"}]),
        );

        let ingested = process_raw_articles(&fx.raw(), &fx.output()).await.unwrap();
        assert_eq!(ingested.report.skipped_files, 2);
        assert_eq!(ingested.report.files_read, 1);

        let out = fx.read_output();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["title"], "Good");
        assert_eq!(out[0]["published"], "2025-06-22");
    }

    #[tokio::test]
    async fn array_with_non_object_items_is_skipped() {
        let fx = Fixture::new();
        fx.batch("mixed.json", json!([{"title": "a"}, "just a string"]));

        let ingested = process_raw_articles(&fx.raw(), &fx.output()).await.unwrap();
        assert_eq!(ingested.report.skipped_files, 1);
        assert!(ingested.articles.is_empty());
        assert!(fx.read_output().is_empty());
    }

    #[tokio::test]
    async fn first_file_in_name_order_wins() {
        let fx = Fixture::new();
        fx.batch(
            "b_second.json",
            json!([{"title": "From B", "link": "http://same.com/x", "published": "2025-01-02"}]),
        );
        fx.batch(
            "a_first.json",
            json!([{"title": "From A", "link": "http://same.com/x", "published": "2025-01-01"}]),
        );

        let ingested = process_raw_articles(&fx.raw(), &fx.output()).await.unwrap();
        assert_eq!(ingested.articles.len(), 1);
        assert_eq!(ingested.articles[0].title, "From A");
        assert_eq!(ingested.report.duplicates, 1);
    }

    #[tokio::test]
    async fn invalid_in_earlier_file_does_not_block_later_valid() {
        let fx = Fixture::new();
        fx.batch(
            "01.json",
            json!([{"title": "  ", "link": "http://same.com/y", "published": "2025-01-01"}]),
        );
        fx.batch(
            "02.json",
            json!([{"title": "Later", "link": "http://same.com/y", "published": "2025-01-03"}]),
        );

        let ingested = process_raw_articles(&fx.raw(), &fx.output()).await.unwrap();
        assert_eq!(ingested.articles.len(), 1);
        assert_eq!(ingested.articles[0].title, "Later");
        assert_eq!(ingested.report.invalid, 1);
    }

    #[tokio::test]
    async fn non_json_files_and_directories_are_ignored() {
        let fx = Fixture::new();
        fx.batch_text("notes.txt", "not a batch");
        stdfs::create_dir_all(fx.raw().join("nested.json")).unwrap();
        fx.batch(
            "real.json",
            json!([{"title": "R", "link": "http://r.com", "published": "2025-03-03"}]),
        );

        let files = list_batch_files(&fx.raw()).await.unwrap();
        assert_eq!(files, vec![fx.raw().join("real.json")]);

        let ingested = process_raw_articles(&fx.raw(), &fx.output()).await.unwrap();
        assert_eq!(ingested.report.skipped_files, 0);
        assert_eq!(ingested.articles.len(), 1);
    }

    #[tokio::test]
    async fn empty_directory_writes_empty_dataset() {
        let fx = Fixture::new();
        let ingested = process_raw_articles(&fx.raw(), &fx.output()).await.unwrap();
        assert_eq!(ingested.report, IngestReport::default());
        assert_eq!(stdfs::read_to_string(fx.output()).unwrap(), "[]");
    }

    #[tokio::test]
    async fn missing_raw_dir_is_fatal() {
        let fx = Fixture::new();
        let missing = fx.dir.path().join("does-not-exist");
        let err = process_raw_articles(&missing, &fx.output()).await.unwrap_err();
        assert!(matches!(err, Error::RawDir { .. }));
        assert!(!fx.output().exists());
    }

    #[tokio::test]
    async fn rerun_is_byte_identical_and_store_stays_unique() {
        let fx = Fixture::new();
        fx.batch(
            "a.json",
            json!([
                {"title": "One", "link": "http://n.com/1", "published": "2025-05-01", "category": "world"},
                {"title": "Two", "link": "http://n.com/2", "published": "Posted 2025/05/02"},
            ]),
        );
        fx.batch(
            "b.json",
            json!([
                {"title": "Two bis", "link": "http://n.com/2", "published": "2025-05-02"},
                {"title": "Three", "link": "http://n.com/3", "published": "2025-05-03", "source": "npr.org"},
            ]),
        );
        let db = fx.dir.path().join("news.db");

        let first = process_raw_articles(&fx.raw(), &fx.output()).await.unwrap();
        let ins1 = store_articles(&db, &first.articles).await.unwrap();
        let bytes1 = stdfs::read(fx.output()).unwrap();

        let second = process_raw_articles(&fx.raw(), &fx.output()).await.unwrap();
        let ins2 = store_articles(&db, &second.articles).await.unwrap();
        let bytes2 = stdfs::read(fx.output()).unwrap();

        assert_eq!(bytes1, bytes2);
        assert_eq!(first.articles, second.articles);
        assert_eq!(ins1.inserted, 3);
        assert_eq!(ins2.inserted, 0);
        assert_eq!(ins2.ignored, 3);

        let store = ArticleStore::open(&db).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn stored_rows_carry_the_merged_source() {
        let fx = Fixture::new();
        fx.batch(
            "a.json",
            json!([{"title": "Three", "link": "http://n.com/3", "published": "2025-05-03", "source": "npr.org"}]),
        );
        let db = fx.dir.path().join("news.db");

        let ingested = process_raw_articles(&fx.raw(), &fx.output()).await.unwrap();
        store_articles(&db, &ingested.articles).await.unwrap();

        assert_eq!(fx.read_output()[0]["source"], "npr.org");
        let pool = sqlx::SqlitePool::connect(&format!("sqlite://{}", db.display()))
            .await
            .unwrap();
        let sources: Vec<String> = sqlx::query_scalar("SELECT source FROM articles")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(sources, vec!["merged".to_string()]);
    }

    #[tokio::test]
    async fn store_failure_leaves_written_dataset() {
        let fx = Fixture::new();
        fx.batch(
            "a.json",
            json!([{"title": "A", "link": "https://a.com", "published": "2025-01-01"}]),
        );
        // a directory cannot be opened as a database file
        let db = fx.dir.path().join("db_is_a_dir");
        stdfs::create_dir_all(&db).unwrap();

        let ingested = process_raw_articles(&fx.raw(), &fx.output()).await.unwrap();
        assert!(store_articles(&db, &ingested.articles).await.is_err());
        assert_eq!(fx.read_output().len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_batch_is_ingested() {
        let fx = Fixture::new();
        let elsewhere = fx.dir.path().join("elsewhere");
        stdfs::create_dir_all(&elsewhere).unwrap();
        let target = elsewhere.join("static_articles.json");
        stdfs::write(
            &target,
            json!([{"title": "Linked", "link": "https://l.com/1", "published": "2025-04-04"}]).to_string(),
        )
        .unwrap();
        std::os::unix::fs::symlink(&target, fx.raw().join("static.json")).unwrap();

        let ingested = process_raw_articles(&fx.raw(), &fx.output()).await.unwrap();
        assert_eq!(ingested.report.files_read, 1);
        assert_eq!(ingested.report.accepted, 1);
        assert_eq!(ingested.articles[0].title, "Linked");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dangling_symlink_counts_as_skipped_file() {
        let fx = Fixture::new();
        std::os::unix::fs::symlink(fx.dir.path().join("gone.json"), fx.raw().join("gone.json")).unwrap();

        let ingested = process_raw_articles(&fx.raw(), &fx.output()).await.unwrap();
        assert_eq!(ingested.report.skipped_files, 1);
        assert_eq!(ingested.report.files_read, 0);
    }

    #[tokio::test]
    async fn file_named_only_dot_json_is_a_batch() {
        let fx = Fixture::new();
        fx.batch(
            ".json",
            json!([{"title": "Hidden", "link": "https://h.com", "published": "2025-02-02"}]),
        );

        let files = list_batch_files(&fx.raw()).await.unwrap();
        assert_eq!(files, vec![fx.raw().join(".json")]);
    }
}
