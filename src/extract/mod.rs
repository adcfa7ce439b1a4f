//! Page extraction and link resolution
//!
//! This module is the core of the indexer. Given the fetched HTML of one page
//! it:
//! - Resolves every anchor into an absolute, fragment-free URL
//! - Extracts title, meta description, meta keywords, language and group
//! - Builds the cleaned index content, honoring the in-page control tags
//! - Sanitizes all extracted text

mod context;
pub mod control_tags;
mod document;
mod links;
mod page;
mod sanitize;

pub use context::PageContext;
pub use document::FetchedDocument;
pub use links::{encode_path, resolve_candidate, resolve_links, Link, LinkCandidate};
pub use page::{CrawlPage, ExtractionResult, FetchState};
pub use sanitize::{collapse_whitespace, sanitize, strip_tags};
