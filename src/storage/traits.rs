//! Storage traits and error types
//!
//! This module defines the trait interface for index backends and
//! associated error types.

use crate::extract::ExtractionResult;
use crate::storage::{
    IndexedPage, LinkRecord, RunRecord, RunStatistics, RunStatus, SearchPage, SearchQuery,
};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for index storage implementations
///
/// This trait defines every operation the crawler and the search front end
/// need from the index.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as completed and stores its statistics
    fn finish_run(&mut self, run_id: i64, statistics: &RunStatistics) -> StorageResult<()>;

    /// Updates the status of a run
    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Pages =====

    /// Inserts or replaces the index record of `url`
    ///
    /// # Returns
    ///
    /// The page ID
    fn upsert_page(&mut self, url: &str, result: &ExtractionResult, run_id: i64)
        -> StorageResult<i64>;

    /// Gets a page by URL
    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<IndexedPage>>;

    /// Counts indexed pages
    fn count_pages(&self) -> StorageResult<u64>;

    /// Removes pages and links not refreshed by `run_id`
    ///
    /// # Returns
    ///
    /// The number of pages removed
    fn remove_stale(&mut self, run_id: i64) -> StorageResult<u64>;

    // ===== Links =====

    /// Records a link found on `source_url`
    fn insert_link(
        &mut self,
        url: &str,
        title: &str,
        source_url: &str,
        run_id: i64,
    ) -> StorageResult<()>;

    /// Gets all links found on a page
    fn get_links_from(&self, source_url: &str) -> StorageResult<Vec<LinkRecord>>;

    /// Counts the total number of links
    fn count_links(&self) -> StorageResult<u64>;

    // ===== Search =====

    /// Runs a search query and returns one page of results
    fn search(&self, query: &SearchQuery) -> StorageResult<SearchPage>;

    /// Records an executed search with its number of results
    fn record_search(&mut self, query: &SearchQuery, results: u64) -> StorageResult<()>;

    /// Counts recorded searches
    fn count_searches(&self) -> StorageResult<u64>;
}
