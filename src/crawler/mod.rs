//! Crawler module for fetching pages and walking the site
//!
//! This module contains the collaborators around the extraction core:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - The crawl frontier and its link policy
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;

pub use coordinator::{run_crawl, CrawlSummary};
pub use fetcher::{build_http_client, fetch_url, FetchResponse, Fetcher, HttpFetcher};
pub use frontier::{Frontier, FrontierDecision};
