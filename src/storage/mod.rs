//! Storage module for persisting the search index
//!
//! This module handles all database operations for the indexer, including:
//! - SQLite database initialization and schema management
//! - Page records holding the extraction results
//! - Link records (which page links where)
//! - Run tracking with aggregate statistics
//! - Search query execution over the indexed pages

mod schema;
mod search;
mod sqlite;
mod traits;

pub use search::{SearchPage, SearchQuery};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use serde::Serialize;
use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents an indexed page in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedPage {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub content: String,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub language: Option<String>,
    pub group: String,
    pub content_type: Option<String>,
    pub indexed_at: String,
    pub run_id: i64,
}

/// Represents a link found on an indexed page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub source_url: String,
    pub run_id: i64,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub statistics: RunStatistics,
}

/// Aggregate counters of one crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// Pages whose fetch was attempted
    pub pages_visited: u64,
    /// Pages written to the index
    pub pages_indexed: u64,
    /// Pages whose fetch failed
    pub pages_failed: u64,
    /// Fetched pages that were not HTML
    pub pages_skipped: u64,
    /// Links resolved on indexed pages
    pub links_found: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_from_db_string() {
        assert_eq!(RunStatus::from_db_string("completed"), Some(RunStatus::Completed));
        assert_eq!(RunStatus::from_db_string("running"), Some(RunStatus::Running));
    }

    #[test]
    fn test_run_status_invalid() {
        assert_eq!(RunStatus::from_db_string("interrupted"), None);
    }
}
