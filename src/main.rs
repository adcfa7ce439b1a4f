//! Site-Indexer main entry point
//!
//! This is the command-line interface for crawling a site into the search
//! index and querying it.

use anyhow::{Context, Result};
use clap::Parser;
use site_indexer::config::{load_config_with_hash, Config};
use site_indexer::crawler::{run_crawl, HttpFetcher};
use site_indexer::output::{load_statistics, print_search_page, print_statistics};
use site_indexer::storage::{open_storage, SearchQuery, Storage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Site-Indexer: crawls one site and builds a searchable page index
///
/// Every page reachable from the base URL is fetched, its text content and
/// metadata extracted, and the result stored in a SQLite index that can be
/// searched from the command line.
#[derive(Parser, Debug)]
#[command(name = "site-indexer")]
#[command(version = "1.0.0")]
#[command(about = "Crawls a site into a searchable page index", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "search"])]
    dry_run: bool,

    /// Show statistics from the index database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "search"])]
    stats: bool,

    /// Search the index and exit
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Only return pages of this crawl group
    #[arg(long, requires = "search")]
    group: Option<String>,

    /// Only return pages in this language
    #[arg(long, requires = "search")]
    language: Option<String>,

    /// Result page to show (1-based)
    #[arg(long, default_value_t = 1, requires = "search")]
    page: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(query) = &cli.search {
        handle_search(&config, query, &cli)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_indexer=info,warn"),
            1 => EnvFilter::new("site_indexer=debug,info"),
            2 => EnvFilter::new("site_indexer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    let crawler = &config.crawler;

    println!("=== Site-Indexer Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", crawler.base_url);
    println!("  Use first h1 as title: {}", crawler.use_h1);
    println!("  Verbose extraction: {}", crawler.verbose);
    println!("  Concurrency: {}", crawler.concurrency);
    if crawler.max_pages == 0 {
        println!("  Max pages: unlimited");
    } else {
        println!("  Max pages: {}", crawler.max_pages);
    }

    println!("\nFilters ({}):", crawler.filter_regex.len());
    for pattern in &crawler.filter_regex {
        println!("  - {}", pattern);
    }
    println!(
        "\nSkipped extensions: {}",
        crawler.do_not_follow_extensions.join(", ")
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Search page size: {}", config.search.page_size);

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", crawler.base_url);
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .context("Failed to open index database")?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --search mode: runs one query against the index
fn handle_search(config: &Config, query: &str, cli: &Cli) -> Result<()> {
    let mut storage = open_storage(Path::new(&config.output.database_path))
        .context("Failed to open index database")?;

    let mut search = SearchQuery::new(query, config.search.page_size).with_page(cli.page);
    if let Some(group) = &cli.group {
        search = search.with_group(group.clone());
    }
    if let Some(language) = &cli.language {
        search = search.with_language(language.clone());
    }

    let results = storage.search(&search)?;
    storage.record_search(&search, results.total)?;
    tracing::debug!("Search {:?} matched {} pages", search.query, results.total);

    print_search_page(&results);
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> Result<()> {
    tracing::info!(
        "Crawling {} with concurrency {}",
        config.crawler.base_url,
        config.crawler.concurrency
    );

    let mut storage = open_storage(Path::new(&config.output.database_path))
        .context("Failed to open index database")?;
    let fetcher = HttpFetcher::new(&config.user_agent).context("Failed to build HTTP client")?;

    let summary = run_crawl(config, config_hash, &mut storage, &fetcher)
        .await
        .context("Crawl failed")?;

    tracing::info!(
        "Run {} finished: {} pages indexed in {:.1}s",
        summary.run_id,
        summary.statistics.pages_indexed,
        summary.elapsed.as_secs_f64()
    );

    Ok(())
}
