//! Summary report generation.
//!
//! Renders a [`Summary`] into files under the reports directory:
//!
//! ```text
//! reports_dir/
//! ├── summary_report.md        # totals, categories, sources, dates, activity
//! └── top_keywords_titles.csv  # keyword,count
//! ```
//!
//! Both files are rewritten on every run.

use crate::analysis::Summary;
use crate::error::Result;
use crate::outputs::json::write_atomic;
use crate::utils::upcase;
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const REPORT_FILE: &str = "summary_report.md";
pub const KEYWORDS_FILE: &str = "top_keywords_titles.csv";

/// Render the Markdown summary report.
pub fn render_markdown(summary: &Summary) -> std::result::Result<String, fmt::Error> {
    let mut md = String::new();

    writeln!(md, "# News Summary Report\n")?;
    writeln!(md, "**Total articles:** {}\n", summary.total_articles)?;

    writeln!(md, "## Articles by Category\n")?;
    for (category, count) in &summary.by_category {
        writeln!(md, "- {} - {}", upcase(category), count)?;
    }

    writeln!(md, "\n## Articles by Source\n")?;
    for (source, count) in &summary.by_source {
        writeln!(md, "- `{}` - {}", source, count)?;
    }

    writeln!(md, "\n## Top Publishing Dates\n")?;
    writeln!(md, "| Date | Articles |")?;
    writeln!(md, "|------|----------|")?;
    for (date, count) in &summary.top_dates {
        writeln!(md, "| {} | {} |", date, count)?;
    }

    writeln!(md, "\n## Publishing Activity\n")?;
    writeln!(md, "| Date | Articles | 7-entry average |")?;
    writeln!(md, "|------|----------|-----------------|")?;
    for day in &summary.activity {
        let avg = day
            .moving_average
            .map(|a| format!("{:.2}", a))
            .unwrap_or_else(|| "-".to_string());
        writeln!(md, "| {} | {} | {} |", day.date, day.count, avg)?;
    }

    writeln!(md, "\n## Top Keywords in Titles\n")?;
    for (word, count) in &summary.top_keywords {
        writeln!(md, "1. **{}** ({})", word, count)?;
    }

    Ok(md)
}

/// Render `keyword,count` lines.
pub fn render_keywords_csv(summary: &Summary) -> String {
    let mut csv = String::from("keyword,count\n");
    for (word, count) in &summary.top_keywords {
        csv.push_str(&format!("{},{}\n", word, count));
    }
    csv
}

/// Write the Markdown report and keyword CSV into `reports_dir`.
///
/// Returns the paths written.
#[instrument(level = "info", skip_all, fields(reports_dir = %reports_dir.display()))]
pub async fn write_report(reports_dir: &Path, summary: &Summary) -> Result<Vec<PathBuf>> {
    let md = render_markdown(summary).map_err(|e| std::io::Error::other(e.to_string()))?;
    let report_path = reports_dir.join(REPORT_FILE);
    write_atomic(&report_path, md.as_bytes()).await?;

    let csv_path = reports_dir.join(KEYWORDS_FILE);
    write_atomic(&csv_path, render_keywords_csv(summary).as_bytes()).await?;

    info!(report = %report_path.display(), keywords = %csv_path.display(), "Generated summary report");
    Ok(vec![report_path, csv_path])
}
