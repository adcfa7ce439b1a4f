//! Site-Indexer: a bounded site crawler feeding a search index
//!
//! The crate crawls a single web site from its base URL, extracts sanitized
//! text and metadata from every fetched page, resolves the page's links into
//! absolute crawl-eligible URLs, and persists the results into a searchable
//! SQLite index.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Site-Indexer operations
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid regular expression: {0}")]
    Regex(#[from] regex::Error),
}

/// Configuration-specific errors
///
/// These are the only errors that surface as hard failures: they indicate a
/// setup mistake rather than a page-level runtime condition.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("base URL can not be empty")]
    MissingBaseUrl,

    #[error("Invalid filter pattern: {0}")]
    InvalidPattern(String),
}

/// Reasons a page fetch did not produce a usable document
///
/// A fetch failure is a normal per-page outcome: the page extractors degrade
/// to their empty values and the crawl continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("response status is {0}, expected 200")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Reasons a single anchor is dropped from a page's link list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("non-navigable href: {0}")]
    Rejected(String),

    #[error("malformed href {href}: {reason}")]
    Malformed { href: String, reason: String },
}

/// Result type alias for Site-Indexer operations
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Fetcher, Frontier, HttpFetcher};
pub use extract::{sanitize, CrawlPage, ExtractionResult, Link, PageContext};
pub use storage::{SqliteStorage, Storage};
