//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::extract::ExtractionResult;
use crate::storage::schema::initialize_schema;
use crate::storage::search::{like_pattern, SCORED_COLUMNS};
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{
    IndexedPage, LinkRecord, RunRecord, RunStatistics, RunStatus, SearchPage, SearchQuery,
};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;

const PAGE_COLUMNS: &str = "id, url, title, content, description, keywords, language, \
     page_group, content_type, indexed_at, run_id";

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, \
     pages_visited, pages_indexed, pages_failed, pages_skipped, links_found";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<IndexedPage> {
    Ok(IndexedPage {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        description: row.get(4)?,
        keywords: row.get(5)?,
        language: row.get(6)?,
        group: row.get(7)?,
        content_type: row.get(8)?,
        indexed_at: row.get(9)?,
        run_id: row.get(10)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    let count = |idx: usize| -> rusqlite::Result<u64> { Ok(row.get::<_, i64>(idx)? as u64) };

    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Running),
        statistics: RunStatistics {
            pages_visited: count(5)?,
            pages_indexed: count(6)?,
            pages_failed: count(7)?,
            pages_skipped: count(8)?,
            links_found: count(9)?,
        },
    })
}

/// Builds the `WHERE` clause and bound values of a search
///
/// Every term gets its own numbered parameter, shared by the match condition
/// and the score expression.
fn search_filter(query: &SearchQuery, terms: &[&str]) -> (String, String, Vec<String>) {
    let mut values: Vec<String> = terms.iter().map(|term| like_pattern(term)).collect();

    let mut conditions: Vec<String> = (1..=terms.len())
        .map(|idx| {
            let matches: Vec<String> = SCORED_COLUMNS
                .iter()
                .map(|(column, _)| format!("{} LIKE ?{} ESCAPE '\\'", column, idx))
                .collect();
            format!("({})", matches.join(" OR "))
        })
        .collect();

    if let Some(group) = &query.group {
        values.push(group.clone());
        conditions.push(format!("page_group = ?{}", values.len()));
    }

    if let Some(language) = &query.language {
        values.push(language.clone());
        conditions.push(format!("language = ?{}", values.len()));
    }

    let score: Vec<String> = (1..=terms.len())
        .flat_map(|idx| {
            SCORED_COLUMNS.iter().map(move |(column, weight)| {
                format!(
                    "(CASE WHEN {} LIKE ?{} ESCAPE '\\' THEN {} ELSE 0 END)",
                    column, idx, weight
                )
            })
        })
        .collect();

    (conditions.join(" AND "), score.join(" + "), values)
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, statistics: &RunStatistics) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_visited = ?3, \
             pages_indexed = ?4, pages_failed = ?5, pages_skipped = ?6, links_found = ?7 \
             WHERE id = ?8",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                statistics.pages_visited as i64,
                statistics.pages_indexed as i64,
                statistics.pages_failed as i64,
                statistics.pages_skipped as i64,
                statistics.links_found as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE runs SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), run_id],
        )?;
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        let run = self.conn.query_row(&sql, [], run_from_row).optional()?;
        Ok(run)
    }

    // ===== Pages =====

    fn upsert_page(
        &mut self,
        url: &str,
        result: &ExtractionResult,
        run_id: i64,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO pages (url, title, content, description, keywords, language, \
             page_group, content_type, indexed_at, run_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
             ON CONFLICT(url) DO UPDATE SET title = excluded.title, \
             content = excluded.content, description = excluded.description, \
             keywords = excluded.keywords, language = excluded.language, \
             page_group = excluded.page_group, content_type = excluded.content_type, \
             indexed_at = excluded.indexed_at, run_id = excluded.run_id",
            params![
                url,
                result.title,
                result.content,
                result.meta_description,
                result.meta_keywords,
                result.language_info,
                result.group,
                result.content_type,
                now,
                run_id
            ],
        )?;

        let id: i64 = self.conn.query_row(
            "SELECT id FROM pages WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<IndexedPage>> {
        let sql = format!("SELECT {} FROM pages WHERE url = ?1", PAGE_COLUMNS);
        let page = self
            .conn
            .query_row(&sql, params![url], page_from_row)
            .optional()?;
        Ok(page)
    }

    fn count_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn remove_stale(&mut self, run_id: i64) -> StorageResult<u64> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM links WHERE run_id < ?1", params![run_id])?;
        let removed = tx.execute("DELETE FROM pages WHERE run_id < ?1", params![run_id])?;
        tx.commit()?;
        Ok(removed as u64)
    }

    // ===== Links =====

    fn insert_link(
        &mut self,
        url: &str,
        title: &str,
        source_url: &str,
        run_id: i64,
    ) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO links (url, title, source_url, run_id) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(url, source_url) DO UPDATE SET title = excluded.title, \
             run_id = excluded.run_id",
            params![url, title, source_url, run_id],
        )?;
        Ok(())
    }

    fn get_links_from(&self, source_url: &str) -> StorageResult<Vec<LinkRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, title, source_url, run_id FROM links \
             WHERE source_url = ?1 ORDER BY id",
        )?;

        let links = stmt
            .query_map(params![source_url], |row| {
                Ok(LinkRecord {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    title: row.get(2)?,
                    source_url: row.get(3)?,
                    run_id: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn count_links(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Search =====

    fn search(&self, query: &SearchQuery) -> StorageResult<SearchPage> {
        let terms = query.terms();
        if terms.is_empty() {
            return Ok(SearchPage::empty(query));
        }

        let (filter, score, values) = search_filter(query, &terms);

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM pages WHERE {}", filter),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {} FROM pages WHERE {} ORDER BY ({}) DESC, url ASC LIMIT {} OFFSET {}",
            PAGE_COLUMNS,
            filter,
            score,
            query.page_size,
            query.offset()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(values.iter()), page_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SearchPage {
            total: total as u64,
            items,
            ..SearchPage::empty(query)
        })
    }

    fn record_search(&mut self, query: &SearchQuery, results: u64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO searches (query, page_group, language, results, searched_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                query.query,
                query.group,
                query.language,
                results as i64,
                now
            ],
        )?;
        Ok(())
    }

    fn count_searches(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM searches", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
