//! Search queries over the page index
//!
//! A query is split on whitespace into terms. A page matches when every term
//! occurs, case-insensitively, in its title, content, description or keywords.
//! Matches are ranked by where the terms occur and returned one page at a time.

use crate::storage::IndexedPage;
use serde::Serialize;

/// Column weights used to rank matches
pub(crate) const SCORED_COLUMNS: &[(&str, u32)] = &[
    ("title", 4),
    ("description", 2),
    ("keywords", 2),
    ("content", 1),
];

/// A search request against the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub group: Option<String>,
    pub language: Option<String>,
    /// 1-based result page
    pub page: u32,
    pub page_size: u32,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, page_size: u32) -> Self {
        Self {
            query: query.into(),
            group: None,
            language: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Restricts results to pages of a `[CRAWL_GROUP]`
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Selects the result page; values below 1 select the first page
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// The whitespace separated terms of the query
    pub fn terms(&self) -> Vec<&str> {
        self.query.split_whitespace().collect()
    }

    /// Number of rows skipped before the requested page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    pub query: String,
    pub page: u32,
    pub page_size: u32,
    /// Number of matching pages over all result pages
    pub total: u64,
    pub items: Vec<IndexedPage>,
}

impl SearchPage {
    pub fn empty(query: &SearchQuery) -> Self {
        Self {
            query: query.query.clone(),
            page: query.page,
            page_size: query.page_size,
            total: 0,
            items: Vec::new(),
        }
    }

    /// Number of result pages needed for `total` matches
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.page_count()
    }
}

/// Escapes `LIKE` wildcards so a term matches literally
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
