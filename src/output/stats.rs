//! Statistics generation from the index database
//!
//! This module provides functionality for extracting and displaying
//! index and crawl run statistics from the storage layer.

use crate::storage::{RunRecord, Storage, StorageResult};
use chrono::{DateTime, Utc};

/// Index statistics summary
#[derive(Debug, Clone)]
pub struct IndexStatistics {
    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,

    /// Duration of the latest run when it has finished
    pub duration_seconds: Option<u64>,

    /// Number of pages in the index
    pub total_pages: u64,

    /// Number of recorded links
    pub total_links: u64,

    /// Number of executed searches
    pub total_searches: u64,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(IndexStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics<S: Storage + ?Sized>(storage: &S) -> StorageResult<IndexStatistics> {
    let latest_run = storage.get_latest_run()?;
    let duration_seconds = latest_run.as_ref().and_then(run_duration);

    Ok(IndexStatistics {
        latest_run,
        duration_seconds,
        total_pages: storage.count_pages()?,
        total_links: storage.count_links()?,
        total_searches: storage.count_searches()?,
    })
}

fn run_duration(run: &RunRecord) -> Option<u64> {
    let started = run.started_at.parse::<DateTime<Utc>>().ok()?;
    let finished = run.finished_at.as_ref()?.parse::<DateTime<Utc>>().ok()?;
    Some((finished - started).num_seconds().max(0) as u64)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &IndexStatistics) {
    println!("=== Index Statistics ===\n");

    println!("Overview:");
    println!("  Indexed pages: {}", stats.total_pages);
    println!("  Recorded links: {}", stats.total_links);
    println!("  Searches: {}", stats.total_searches);
    println!();

    let Some(run) = &stats.latest_run else {
        println!("No crawl runs found in database");
        return;
    };

    println!("Latest Run:");
    println!("  Run ID: {}", run.id);
    println!("  Status: {}", run.status.to_db_string());
    println!("  Started: {}", run.started_at);
    if let Some(finished) = &run.finished_at {
        println!("  Finished: {}", finished);
    }
    if let Some(duration) = stats.duration_seconds {
        println!("  Duration: {} seconds", duration);
    }
    println!("  Config hash: {}", run.config_hash);
    println!();

    let counters = &run.statistics;
    println!("Pages:");
    println!("  Visited: {}", counters.pages_visited);
    println!("  Indexed: {}", counters.pages_indexed);
    println!("  Failed: {}", counters.pages_failed);
    println!("  Skipped (not HTML): {}", counters.pages_skipped);
    println!("  Links found: {}", counters.links_found);
    println!();

    let success_rate = if counters.pages_visited > 0 {
        (counters.pages_indexed as f64 / counters.pages_visited as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages indexed)",
        success_rate, counters.pages_indexed, counters.pages_visited
    );
}
