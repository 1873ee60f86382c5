//! Output generation for the cleaned dataset and its reports.
//!
//! # Submodules
//!
//! - [`json`]: atomic JSON writes of the dataset and its export copy
//! - [`report`]: Markdown summary report and keyword CSV
//!
//! # Output Structure
//!
//! ```text
//! data_output/
//! ├── processed/cleaned_articles.json
//! ├── exports/articles.json
//! └── reports/
//!     ├── summary_report.md
//!     └── top_keywords_titles.csv
//! ```

pub mod json;
pub mod report;
