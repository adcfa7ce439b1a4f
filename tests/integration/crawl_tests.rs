//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use site_indexer::config::{Config, CrawlerConfig, OutputConfig, SearchConfig, UserAgentConfig};
use site_indexer::crawler::{run_crawl, HttpFetcher};
use site_indexer::storage::{RunStatus, SearchQuery, SqliteStorage, Storage};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `base_url` into `db_path`
fn create_test_config(base_url: &str, db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: base_url.to_string(),
            concurrency: 2,
            filter_regex: vec!["private/".to_string()],
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig {
            value: "SiteIndexerTest/1.0".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
        search: SearchConfig::default(),
    }
}

/// Mounts an HTML page at `route`
async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

/// Mounts a route that must never be requested
async fn mount_forbidden(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .expect(0)
        .mount(server)
        .await;
}

async fn crawl(config: &Config, storage: &mut SqliteStorage) -> site_indexer::crawler::CrawlSummary {
    let fetcher = HttpFetcher::new(&config.user_agent).expect("Failed to build fetcher");
    run_crawl(config, "test_hash", storage, &fetcher)
        .await
        .expect("Crawl failed")
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><head><title>Home</title></head><body>
        <p>Welcome home</p>
        <a href="/page1">Page 1</a>
        <a href="page2">Page 2</a>
        <a href="/docs/guide.pdf">Guide</a>
        <a href="/private/area">Private</a>
        <a href="mailto:info@example.com">Mail</a>
        <a href="tel:+41000000">Call</a>
        <a href="/missing">Gone</a>
        </body></html>"#,
    )
    .await;

    mount_html(
        &mock_server,
        "/page1",
        r#"<html lang="en"><head><title>Page 1</title>
        <meta name="description" content="First page">
        </head><body><p>[CRAWL_TITLE]Custom One[/CRAWL_TITLE] Welcome content</p>
        <a href="/">Home</a></body></html>"#,
    )
    .await;

    mount_html(
        &mock_server,
        "/page2",
        r#"<html><head><title>Page 2</title></head><body>
        [CRAWL_GROUP]docs[/CRAWL_GROUP]<p>More content</p>
        [CRAWL_IGNORE]<p>navigation</p>[/CRAWL_IGNORE]
        <script>var hidden = "content";</script>
        </body></html>"#,
    )
    .await;

    mount_forbidden(&mock_server, "/docs/guide.pdf").await;
    mount_forbidden(&mock_server, "/private/area").await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("index.db");
    let config = create_test_config(&base_url, db_path.to_str().expect("utf-8 path"));

    let mut storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
    let summary = crawl(&config, &mut storage).await;

    // /, /page1, /page2 and the 404 at /missing
    let stats = summary.statistics;
    assert_eq!(stats.pages_visited, 4);
    assert_eq!(stats.pages_indexed, 3);
    assert_eq!(stats.pages_failed, 1);
    assert_eq!(stats.pages_skipped, 0);
    assert_eq!(stats.links_found, 6);

    assert_eq!(storage.count_pages().expect("Failed to count pages"), 3);

    let page1 = storage
        .get_page_by_url(&format!("{}/page1", base_url))
        .expect("Failed to query page")
        .expect("page1 should be indexed");
    assert_eq!(page1.title.as_deref(), Some("Custom One"));
    assert_eq!(page1.description.as_deref(), Some("First page"));
    assert_eq!(page1.language.as_deref(), Some("en"));

    let page2 = storage
        .get_page_by_url(&format!("{}/page2", base_url))
        .expect("Failed to query page")
        .expect("page2 should be indexed");
    assert_eq!(page2.group, "docs");
    assert!(page2.content.contains("More content"));
    assert!(!page2.content.contains("navigation"));
    assert!(!page2.content.contains("hidden"));

    let home_links = storage
        .get_links_from(&format!("{}/", base_url))
        .expect("Failed to query links");
    let urls: Vec<&str> = home_links.iter().map(|l| l.url.as_str()).collect();
    assert!(urls.contains(&format!("{}/docs/guide.pdf", base_url).as_str()));
    assert!(urls.iter().all(|u| !u.starts_with("mailto:")));

    let run = storage.get_run(summary.run_id).expect("Failed to load run");
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.statistics, stats);
}

#[tokio::test]
async fn test_non_html_pages_are_not_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><head><title>Home</title></head><body><a href="/feed">Feed</a></body></html>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<rss><a href="/hidden">Hidden</a></rss>"#,
            "application/rss+xml",
        ))
        .mount(&mock_server)
        .await;

    mount_forbidden(&mock_server, "/hidden").await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("index.db");
    let config = create_test_config(&base_url, db_path.to_str().expect("utf-8 path"));

    let mut storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
    let summary = crawl(&config, &mut storage).await;

    assert_eq!(summary.statistics.pages_visited, 2);
    assert_eq!(summary.statistics.pages_indexed, 1);
    assert_eq!(summary.statistics.pages_skipped, 1);
    assert!(storage
        .get_page_by_url(&format!("{}/feed", base_url))
        .expect("Failed to query page")
        .is_none());
}

#[tokio::test]
async fn test_absolute_links_lose_their_port() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // The resolved link points at the default port and is off-site
    mount_html(
        &mock_server,
        "/",
        &format!(
            r#"<html><body><a href="{}/absolute">Absolute</a></body></html>"#,
            base_url
        ),
    )
    .await;
    mount_forbidden(&mock_server, "/absolute").await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("index.db");
    let config = create_test_config(&base_url, db_path.to_str().expect("utf-8 path"));

    let mut storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
    let summary = crawl(&config, &mut storage).await;

    assert_eq!(summary.statistics.pages_visited, 1);
    assert_eq!(summary.statistics.links_found, 1);

    let links = storage
        .get_links_from(&format!("{}/", base_url))
        .expect("Failed to query links");
    assert_eq!(links[0].url, "http://127.0.0.1/absolute");
}

#[tokio::test]
async fn test_recrawl_removes_unreachable_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><body><a href="/old">Old</a></body></html>"#,
    )
    .await;
    mount_html(&mock_server, "/old", "<html><body>Old page</body></html>").await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("index.db");
    let config = create_test_config(&base_url, db_path.to_str().expect("utf-8 path"));

    let mut storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
    crawl(&config, &mut storage).await;
    assert_eq!(storage.count_pages().expect("Failed to count pages"), 2);

    mock_server.reset().await;
    mount_html(&mock_server, "/", "<html><body>Nothing linked</body></html>").await;

    let second = crawl(&config, &mut storage).await;

    assert_eq!(second.statistics.pages_indexed, 1);
    assert_eq!(storage.count_pages().expect("Failed to count pages"), 1);
    assert_eq!(storage.count_links().expect("Failed to count links"), 0);
    assert!(storage
        .get_page_by_url(&format!("{}/old", base_url))
        .expect("Failed to query page")
        .is_none());
}

#[tokio::test]
async fn test_search_after_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><head><title>Welcome</title></head><body>
        <p>Start page</p><a href="/install">Install</a><a href="/blog">Blog</a>
        </body></html>"#,
    )
    .await;
    mount_html(
        &mock_server,
        "/install",
        r#"<html><head><title>Installation</title></head><body>
        [CRAWL_GROUP]docs[/CRAWL_GROUP]<p>Install with composer</p></body></html>"#,
    )
    .await;
    mount_html(
        &mock_server,
        "/blog",
        r#"<html><head><title>Blog</title></head><body>
        [CRAWL_GROUP]news[/CRAWL_GROUP]<p>Why we love composer</p></body></html>"#,
    )
    .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("index.db");
    let config = create_test_config(&base_url, db_path.to_str().expect("utf-8 path"));

    let mut storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
    crawl(&config, &mut storage).await;

    let query = SearchQuery::new("Composer", config.search.page_size);
    let results = storage.search(&query).expect("Search failed");
    assert_eq!(results.total, 2);

    let docs = SearchQuery::new("composer", config.search.page_size).with_group("docs");
    let results = storage.search(&docs).expect("Search failed");
    assert_eq!(results.total, 1);
    assert_eq!(results.items[0].url, format!("{}/install", base_url));
    assert_eq!(results.items[0].title.as_deref(), Some("Installation"));

    storage
        .record_search(&docs, results.total)
        .expect("Failed to record search");
    assert_eq!(storage.count_searches().expect("Failed to count"), 1);
}
