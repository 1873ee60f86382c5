//! SQLite storage sink for canonical articles.
//!
//! The `articles` table carries a UNIQUE constraint on `link` and rows are
//! written with `INSERT OR IGNORE`, so re-running the pipeline against the
//! same database never duplicates a row and never fails on a known link.

use crate::error::Result;
use crate::models::CanonicalArticle;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::{error, info, instrument};

/// Outcome of one bulk insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    /// New rows written.
    pub inserted: usize,
    /// Rows skipped because their link already existed.
    pub ignored: usize,
    /// Rows whose statement failed; the rest of the batch still went in.
    pub failed: usize,
}

/// Handle to the article database.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    pool: SqlitePool,
}

impl ArticleStore {
    /// Open (creating if needed) the database file at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        info!("Opened article database");
        Ok(Self { pool })
    }

    /// Create the `articles` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT,
                link TEXT UNIQUE,
                category TEXT,
                published TEXT,
                source TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert every article in one transaction, skipping known links.
    ///
    /// A failing row is logged and counted; it does not abort the batch.
    #[instrument(level = "info", skip_all, fields(count = articles.len()))]
    pub async fn insert_or_ignore(&self, articles: &[CanonicalArticle]) -> Result<InsertReport> {
        let mut report = InsertReport::default();
        let mut tx = self.pool.begin().await?;

        for article in articles {
            let res = sqlx::query(
                "INSERT OR IGNORE INTO articles (title, link, category, published, source) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&article.title)
            .bind(&article.link)
            .bind(&article.category)
            .bind(&article.published)
            .bind(&article.source)
            .execute(&mut *tx)
            .await;

            match res {
                Ok(done) if done.rows_affected() > 0 => report.inserted += 1,
                Ok(_) => report.ignored += 1,
                Err(e) => {
                    error!(title = %article.title, link = %article.link, error = %e, "Error inserting article");
                    report.failed += 1;
                }
            }
        }

        tx.commit().await?;
        info!(
            inserted = report.inserted,
            ignored = report.ignored,
            failed = report.failed,
            "Inserted articles into the database"
        );
        Ok(report)
    }

    /// Number of stored articles.
    pub async fn count(&self) -> Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, link: &str) -> CanonicalArticle {
        CanonicalArticle {
            title: title.into(),
            link: link.into(),
            category: "test".into(),
            published: "2025-06-17".into(),
            source: "merged".into(),
        }
    }

    async fn setup_store() -> (tempfile::TempDir, ArticleStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArticleStore::open(&dir.path().join("data").join("news.db"))
            .await
            .unwrap();
        store.ensure_schema().await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let (_dir, store) = setup_store().await;
        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn conflicting_links_are_ignored() {
        let (_dir, store) = setup_store().await;

        let first = store
            .insert_or_ignore(&[article("a", "http://x.com/1"), article("b", "http://x.com/2")])
            .await
            .unwrap();
        assert_eq!(
            first,
            InsertReport {
                inserted: 2,
                ignored: 0,
                failed: 0
            }
        );

        let second = store
            .insert_or_ignore(&[article("a again", "http://x.com/1"), article("c", "http://x.com/3")])
            .await
            .unwrap();
        assert_eq!(second.inserted, 1);
        assert_eq!(second.ignored, 1);

        assert_eq!(store.count().await.unwrap(), 3);
        let links: Vec<String> = sqlx::query_scalar("SELECT link FROM articles ORDER BY id")
            .fetch_all(&store.pool)
            .await
            .unwrap();
        assert_eq!(links, vec!["http://x.com/1", "http://x.com/2", "http://x.com/3"]);
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let (_dir, store) = setup_store().await;
        let report = store.insert_or_ignore(&[]).await.unwrap();
        assert_eq!(report, InsertReport::default());
    }

    #[tokio::test]
    async fn insert_without_schema_counts_failures_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArticleStore::open(&dir.path().join("bare.db")).await.unwrap();
        let report = store
            .insert_or_ignore(&[article("a", "http://x.com/1"), article("b", "http://x.com/2")])
            .await
            .unwrap();
        assert_eq!(report.failed, 2);
        assert_eq!(report.inserted, 0);
    }
}
