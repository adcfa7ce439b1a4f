//! Crawl frontier
//!
//! The frontier decides which resolved links get visited:
//! - Only URLs on the base URL's scheme, host and port are followed
//! - URLs matching any configured reject-regex are dropped
//! - URLs whose path extension is in the do-not-follow set are dropped
//! - Every URL is visited at most once per run
//! - An optional page limit bounds the run

use crate::config::CrawlerConfig;
use crate::IndexerError;
use regex::Regex;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Outcome of offering a URL to the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontierDecision {
    /// Queued for fetching
    Enqueued,
    /// Already queued or visited in this run
    AlreadySeen,
    /// Not on the crawled site
    ForeignHost,
    /// Matched the given reject pattern
    Filtered(String),
    /// Path extension is in the do-not-follow set
    SkippedExtension(String),
    /// The page limit has been reached
    LimitReached,
    /// Not a parsable absolute URL
    Invalid,
}

impl FrontierDecision {
    pub fn is_enqueued(&self) -> bool {
        matches!(self, Self::Enqueued)
    }
}

/// FIFO queue of URLs to visit plus the set of URLs already seen
#[derive(Debug)]
pub struct Frontier {
    base: Url,
    filters: Vec<Regex>,
    skip_extensions: HashSet<String>,
    max_pages: Option<usize>,
    seen: HashSet<String>,
    queue: VecDeque<String>,
}

impl Frontier {
    /// Creates a frontier for the site rooted at `base`
    pub fn new(
        base: Url,
        filters: Vec<Regex>,
        skip_extensions: impl IntoIterator<Item = String>,
        max_pages: Option<usize>,
    ) -> Self {
        Self {
            base,
            filters,
            skip_extensions: skip_extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            max_pages,
            seen: HashSet::new(),
            queue: VecDeque::new(),
        }
    }

    /// Builds a frontier from the crawler configuration and seeds the base URL
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, IndexerError> {
        let base = Url::parse(&config.base_url)?;
        let filters = config
            .filter_regex
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let max_pages = (config.max_pages > 0).then_some(config.max_pages);

        let mut frontier = Self::new(
            base.clone(),
            filters,
            config.do_not_follow_extensions.iter().cloned(),
            max_pages,
        );
        frontier.offer(base.as_str());

        Ok(frontier)
    }

    /// Applies the crawl policy to `url` and queues it when eligible
    pub fn offer(&mut self, url: &str) -> FrontierDecision {
        let Ok(parsed) = Url::parse(url) else {
            return FrontierDecision::Invalid;
        };

        let decision = self.classify(&parsed);
        if decision.is_enqueued() {
            self.seen.insert(parsed.to_string());
            self.queue.push_back(parsed.to_string());
        }

        decision
    }

    fn classify(&self, url: &Url) -> FrontierDecision {
        if !self.is_same_site(url) {
            return FrontierDecision::ForeignHost;
        }

        if self.seen.contains(url.as_str()) {
            return FrontierDecision::AlreadySeen;
        }

        if let Some(filter) = self.filters.iter().find(|f| f.is_match(url.as_str())) {
            return FrontierDecision::Filtered(filter.as_str().to_string());
        }

        if let Some(ext) = path_extension(url) {
            if self.skip_extensions.contains(&ext) {
                return FrontierDecision::SkippedExtension(ext);
            }
        }

        if let Some(max) = self.max_pages {
            if self.seen.len() >= max {
                return FrontierDecision::LimitReached;
            }
        }

        FrontierDecision::Enqueued
    }

    fn is_same_site(&self, url: &Url) -> bool {
        url.scheme() == self.base.scheme()
            && url.host_str() == self.base.host_str()
            && url.port_or_known_default() == self.base.port_or_known_default()
    }

    /// Pops up to `n` URLs in discovery order
    pub fn next_batch(&mut self, n: usize) -> Vec<String> {
        let n = n.min(self.queue.len());
        self.queue.drain(..n).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs waiting to be fetched
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Number of URLs ever queued in this run
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

/// Lower-cased extension of the last path segment
fn path_extension(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    let (stem, ext) = segment.rsplit_once('.')?;

    if stem.is_empty() || ext.is_empty() {
        return None;
    }

    Some(ext.to_lowercase())
}
