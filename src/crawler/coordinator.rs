//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the collaborators together:
//! - Seeding the frontier with the base URL
//! - Fetching and extracting batches of pages concurrently
//! - Persisting extraction results and discovered links
//! - Feeding resolved links back into the frontier
//! - Recording run statistics

use crate::config::{validate, Config, CrawlerConfig};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::extract::{CrawlPage, ExtractionResult, FetchState, PageContext};
use crate::storage::{RunStatistics, RunStatus, Storage};
use crate::{FetchFailure, IndexerError};
use futures::future::join_all;
use std::time::{Duration, Instant};

/// Pages visited between two progress log lines
const PROGRESS_INTERVAL: u64 = 10;

/// Summary of a finished crawl run
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSummary {
    pub run_id: i64,
    pub statistics: RunStatistics,
    pub elapsed: Duration,
}

/// Outcome of visiting one page
#[derive(Debug)]
struct PageVisit {
    url: String,
    result: ExtractionResult,
    failure: Option<FetchFailure>,
}

/// Runs a complete crawl of the configured site
///
/// A page that can not be fetched is counted and skipped; only storage
/// errors abort the run.
///
/// # Arguments
///
/// * `config` - The indexer configuration
/// * `config_hash` - Hash of the configuration file, recorded with the run
/// * `storage` - Index storage receiving pages and links
/// * `fetcher` - Fetch collaborator used for every page
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed
/// * `Err(IndexerError)` - Invalid configuration or storage failure; an
///   invalid configuration is rejected before a run is recorded
pub async fn run_crawl<S, F>(
    config: &Config,
    config_hash: &str,
    storage: &mut S,
    fetcher: &F,
) -> Result<CrawlSummary, IndexerError>
where
    S: Storage,
    F: Fetcher,
{
    validate(config)?;

    let crawler = &config.crawler;
    let site = PageContext::new(&crawler.base_url, &crawler.base_url)?
        .with_use_h1(crawler.use_h1)
        .with_verbose(crawler.verbose);

    let mut frontier = Frontier::from_config(crawler)?;
    let run_id = storage.create_run(config_hash)?;
    let start_time = Instant::now();

    tracing::info!("Starting crawl run {} at {}", run_id, site.base_url());

    let stats = match crawl_site(&site, crawler, storage, fetcher, &mut frontier, run_id).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!("Crawl run {} aborted: {}", run_id, e);
            if let Err(status_err) = storage.update_run_status(run_id, RunStatus::Failed) {
                tracing::warn!("Failed to mark run {} as failed: {}", run_id, status_err);
            }
            return Err(e);
        }
    };

    let removed = storage.remove_stale(run_id)?;
    if removed > 0 {
        tracing::info!("Removed {} pages not reached by run {}", removed, run_id);
    }

    storage.finish_run(run_id, &stats)?;

    let elapsed = start_time.elapsed();
    tracing::info!(
        "Crawl completed: {} pages visited, {} indexed, {} failed, {} links in {:?}",
        stats.pages_visited,
        stats.pages_indexed,
        stats.pages_failed,
        stats.links_found,
        elapsed
    );

    Ok(CrawlSummary {
        run_id,
        statistics: stats,
        elapsed,
    })
}

/// Drains the frontier batch by batch
async fn crawl_site<S, F>(
    site: &PageContext,
    crawler: &CrawlerConfig,
    storage: &mut S,
    fetcher: &F,
    frontier: &mut Frontier,
    run_id: i64,
) -> Result<RunStatistics, IndexerError>
where
    S: Storage,
    F: Fetcher,
{
    let mut stats = RunStatistics::default();
    let start_time = Instant::now();
    let mut progress = Progress::default();

    while !frontier.is_empty() {
        let batch = frontier.next_batch(crawler.concurrency as usize);
        let visits = join_all(
            batch
                .iter()
                .map(|url| visit_page(site.for_page(url), fetcher)),
        )
        .await;

        for visit in visits {
            stats.pages_visited += 1;
            record_visit(storage, frontier, &mut stats, run_id, visit)?;
        }

        if progress.due(stats.pages_visited) {
            let elapsed = start_time.elapsed();
            tracing::info!(
                "Progress: {} pages visited, {} in frontier, {:.2} pages/sec",
                stats.pages_visited,
                frontier.len(),
                stats.pages_visited as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
            );
        }
    }

    Ok(stats)
}

/// Rate limiter for progress log lines
#[derive(Debug, Default)]
struct Progress {
    last_reported: u64,
}

impl Progress {
    /// True once at least `PROGRESS_INTERVAL` pages were visited since the last report
    fn due(&mut self, visited: u64) -> bool {
        if visited - self.last_reported < PROGRESS_INTERVAL {
            return false;
        }
        self.last_reported = visited;
        true
    }
}

/// Fetches and extracts one page on its own facade
async fn visit_page<F: Fetcher>(context: PageContext, fetcher: &F) -> PageVisit {
    let url = context.page_url().to_string();
    let mut page = CrawlPage::new(context, fetcher);
    let result = page.extract().await;

    let failure = match page.state() {
        FetchState::FetchFailed(failure) => Some(failure.clone()),
        _ => None,
    };

    PageVisit {
        url,
        result,
        failure,
    }
}

fn record_visit<S: Storage>(
    storage: &mut S,
    frontier: &mut Frontier,
    stats: &mut RunStatistics,
    run_id: i64,
    visit: PageVisit,
) -> Result<(), IndexerError> {
    if let Some(failure) = visit.failure {
        tracing::debug!("Skipping {}: {}", visit.url, failure);
        stats.pages_failed += 1;
        return Ok(());
    }

    if !is_html(visit.result.content_type.as_deref()) {
        tracing::debug!(
            "Skipping {}: content type {:?} is not HTML",
            visit.url,
            visit.result.content_type
        );
        stats.pages_skipped += 1;
        return Ok(());
    }

    storage.upsert_page(&visit.url, &visit.result, run_id)?;
    stats.pages_indexed += 1;

    for link in &visit.result.links {
        stats.links_found += 1;
        storage.insert_link(&link.url, &link.text, &visit.url, run_id)?;

        let decision = frontier.offer(&link.url);
        tracing::trace!("{} -> {:?}", link.url, decision);
    }

    Ok(())
}

/// Missing content types are treated as HTML
fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(value) => {
            let value = value.to_ascii_lowercase();
            value.contains("text/html") || value.contains("application/xhtml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputConfig, SearchConfig, UserAgentConfig};
    use crate::crawler::FetchResponse;
    use crate::ConfigError;
    use crate::storage::{SqliteStorage, Storage};
    use std::collections::HashMap;

    struct SiteFetcher {
        pages: HashMap<String, (u16, &'static str, &'static str)>,
    }

    impl Fetcher for SiteFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchFailure> {
            match self.pages.get(url) {
                Some((status, content_type, body)) => Ok(FetchResponse {
                    status: *status,
                    content_type: Some(content_type.to_string()),
                    body: body.to_string(),
                }),
                None => Err(FetchFailure::Transport("connection refused".to_string())),
            }
        }
    }

    fn config() -> Config {
        Config {
            crawler: CrawlerConfig {
                base_url: "http://localhost/".to_string(),
                concurrency: 2,
                ..CrawlerConfig::default()
            },
            user_agent: UserAgentConfig::default(),
            output: OutputConfig {
                database_path: ":memory:".to_string(),
            },
            search: SearchConfig::default(),
        }
    }

    fn site() -> SiteFetcher {
        let mut pages = HashMap::new();
        pages.insert(
            "http://localhost/".to_string(),
            (
                200,
                "text/html",
                r#"<html><head><title>Home</title></head><body>
                <a href="/about">About</a>
                <a href="/missing">Gone</a>
                <a href="/report.pdf">Report</a>
                <a href="https://elsewhere.org/">Elsewhere</a>
                <a href="mailto:info@localhost">Mail</a>
                </body></html>"#,
            ),
        );
        pages.insert(
            "http://localhost/about".to_string(),
            (
                200,
                "text/html; charset=utf-8",
                r#"<html><head><title>About</title></head><body>
                <p>About us</p><a href="/">Home</a><a href="/feed">Feed</a>
                </body></html>"#,
            ),
        );
        pages.insert(
            "http://localhost/feed".to_string(),
            (200, "application/rss+xml", "<rss></rss>"),
        );
        SiteFetcher { pages }
    }

    #[tokio::test]
    async fn test_crawl_indexes_reachable_pages() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let summary = run_crawl(&config(), "hash", &mut storage, &site())
            .await
            .unwrap();

        let stats = summary.statistics;
        assert_eq!(stats.pages_visited, 4);
        assert_eq!(stats.pages_indexed, 2);
        assert_eq!(stats.pages_failed, 1);
        assert_eq!(stats.pages_skipped, 1);
        assert_eq!(stats.links_found, 6);

        assert_eq!(storage.count_pages().unwrap(), 2);
        let about = storage.get_page_by_url("http://localhost/about").unwrap().unwrap();
        assert_eq!(about.title.as_deref(), Some("About"));

        let run = storage.get_run(summary.run_id).unwrap();
        assert_eq!(run.statistics, stats);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_run() {
        let mut config = config();
        config.crawler.concurrency = 0;
        let mut storage = SqliteStorage::new_in_memory().unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_crawl(&config, "hash", &mut storage, &site()),
        )
        .await
        .expect("crawl with zero concurrency must return");

        assert!(matches!(
            result,
            Err(IndexerError::Config(ConfigError::Validation(_)))
        ));
        assert!(storage.get_latest_run().unwrap().is_none());
    }

    #[test]
    fn test_progress_reported_across_uneven_batches() {
        let mut progress = Progress::default();
        let reported: Vec<u64> = (1..=10)
            .map(|batch| batch * 3)
            .filter(|&visited| progress.due(visited))
            .collect();

        assert_eq!(reported, vec![12, 24]);
    }

    #[test]
    fn test_is_html() {
        assert!(is_html(None));
        assert!(is_html(Some("text/html")));
        assert!(is_html(Some("Text/HTML; charset=utf-8")));
        assert!(is_html(Some("application/xhtml+xml")));
        assert!(!is_html(Some("application/pdf")));
    }
}
