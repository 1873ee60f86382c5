//! Exponential backoff around any [`BatchSource`].
//!
//! # Retry Strategy
//!
//! - Configurable number of retries after the first failure
//! - Delay starts at `base_delay` and doubles each attempt
//! - Delay capped at 30 seconds
//! - Random jitter (0-250ms) added to every delay

use crate::error::Result;
use crate::scrapers::{BatchSource, ScraperKind};
use rand::{rng, Rng};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Decorator that re-runs a failing source with backoff.
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct Retrying<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> Retrying<T>
where
    T: BatchSource,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    /// Delay before retry number `attempt` (1-based), without jitter.
    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = (attempt.saturating_sub(1)).min(31) as u32;
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

impl<T> fmt::Debug for Retrying<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrying")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> BatchSource for Retrying<T>
where
    T: BatchSource,
{
    fn kind(&self) -> ScraperKind {
        self.inner.kind()
    }

    #[instrument(level = "info", skip_all, fields(kind = %self.kind()))]
    async fn produce_batch(&self, raw_dir: &Path) -> Result<PathBuf> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.produce_batch(raw_dir).await {
                Ok(path) => return Ok(path),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "Scraper exhausted retries"
                        );
                        return Err(e);
                    }

                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = self.backoff(attempt) + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "Scraper attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
