//! Article ingestion and normalization.
//!
//! # Submodules
//!
//! - [`dates`]: finds and canonicalizes a publication date in free text
//! - [`validate`]: decides whether a raw record is usable
//! - [`collector`]: accepts records once per link, in first-seen order
//! - [`pipeline`]: drives the above over a directory of batch files

pub mod collector;
pub mod dates;
pub mod pipeline;
pub mod validate;
