//! Page extraction facade
//!
//! [`CrawlPage`] ties the extractors to one page visit. The document is
//! fetched lazily on the first extractor call and the outcome is cached in a
//! [`FetchState`]; later calls reuse it until the page is [reset](CrawlPage::reset).
//! A failed fetch is a normal outcome: every extractor then returns its empty
//! value instead of an error.

use crate::crawler::Fetcher;
use crate::extract::context::PageContext;
use crate::extract::control_tags::{crawl_group, crawl_title, has_full_ignore, strip_ignored};
use crate::extract::document::FetchedDocument;
use crate::extract::links::{resolve_links, Link};
use crate::extract::sanitize::{sanitize, squash_whitespace};
use crate::FetchFailure;
use serde::Serialize;

/// Snapshot of everything extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub title: Option<String>,
    pub content: String,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub language_info: Option<String>,
    pub group: String,
    pub links: Vec<Link>,
    pub content_type: Option<String>,
}

impl ExtractionResult {
    /// Extracts all fields from a fetched document
    pub fn from_document(document: &FetchedDocument, context: &PageContext) -> Self {
        Self {
            title: title(document, context),
            content: content(document, context),
            meta_description: document.meta_description(),
            meta_keywords: document.meta_keywords(),
            language_info: document.language(),
            group: group(document, context),
            links: resolve_links(document, context),
            content_type: document.content_type().map(str::to_string),
        }
    }
}

/// Fetch outcome cached for the current page visit
#[derive(Debug)]
pub enum FetchState {
    /// No fetch attempted yet
    Unfetched,
    /// Document obtained with status 200
    Fetched(FetchedDocument),
    /// Network error, non-200 status or unreadable body
    FetchFailed(FetchFailure),
}

impl FetchState {
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }
}

/// Extraction facade for one page visit
pub struct CrawlPage<F> {
    context: PageContext,
    fetcher: F,
    state: FetchState,
}

impl<F: Fetcher> CrawlPage<F> {
    /// Creates a facade in the unfetched state
    pub fn new(context: PageContext, fetcher: F) -> Self {
        Self {
            context,
            fetcher,
            state: FetchState::Unfetched,
        }
    }

    /// Injects an already parsed document, skipping the fetch
    pub fn set_document(&mut self, document: FetchedDocument) {
        self.state = FetchState::Fetched(document);
    }

    /// Points the facade at another page and discards the cached document
    pub fn reset(&mut self, page_url: &str) {
        self.context = self.context.for_page(page_url);
        self.state = FetchState::Unfetched;
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Runs the fetch once per page visit
    pub async fn ensure_fetched(&mut self) {
        if !matches!(self.state, FetchState::Unfetched) {
            return;
        }

        let page_url = self.context.page_url().to_string();
        self.context.diagnostic("[GENERATE REQUEST TO]", &page_url);

        self.state = match self.fetcher.fetch(&page_url).await {
            Ok(response) if response.status == 200 => FetchState::Fetched(FetchedDocument::parse(
                &response.body,
                response.content_type,
            )),
            Ok(response) => {
                self.context
                    .diagnostic("[!] Response status is not 200", &response.status.to_string());
                FetchState::FetchFailed(FetchFailure::Status(response.status))
            }
            Err(failure) => {
                tracing::debug!(page = %page_url, "Fetch failed: {}", failure);
                FetchState::FetchFailed(failure)
            }
        };
    }

    fn document(&self) -> Option<&FetchedDocument> {
        match &self.state {
            FetchState::Fetched(document) => Some(document),
            _ => None,
        }
    }

    /// Script-free inner HTML of the body, empty without a document
    pub async fn body_html(&mut self) -> String {
        self.ensure_fetched().await;
        self.document()
            .map(FetchedDocument::body_html)
            .unwrap_or_default()
    }

    /// Response `Content-Type`, `None` without a document
    pub async fn content_type(&mut self) -> Option<String> {
        self.ensure_fetched().await;
        self.document()
            .and_then(|document| document.content_type().map(str::to_string))
    }

    /// Resolved links of the page, empty without a document
    pub async fn links(&mut self) -> Vec<Link> {
        self.ensure_fetched().await;
        match self.document() {
            Some(document) => resolve_links(document, &self.context),
            None => Vec::new(),
        }
    }

    pub async fn language_info(&mut self) -> Option<String> {
        self.ensure_fetched().await;
        self.document().and_then(FetchedDocument::language)
    }

    pub async fn title_tag(&mut self) -> Option<String> {
        self.ensure_fetched().await;
        self.document().and_then(FetchedDocument::title_tag)
    }

    pub async fn title_h1(&mut self) -> Option<String> {
        self.ensure_fetched().await;
        self.document().and_then(FetchedDocument::first_h1)
    }

    /// Inner text of the first `[CRAWL_TITLE]` span
    pub async fn crawl_title_tag(&mut self) -> Option<String> {
        self.ensure_fetched().await;
        self.document()
            .and_then(|document| crawl_title(&document.body_html()).map(str::to_string))
    }

    /// Page title following the control tag, title tag, h1 precedence
    pub async fn title(&mut self) -> Option<String> {
        self.ensure_fetched().await;
        self.document()
            .and_then(|document| title(document, &self.context))
    }

    pub async fn meta_description(&mut self) -> Option<String> {
        self.ensure_fetched().await;
        self.document().and_then(FetchedDocument::meta_description)
    }

    pub async fn meta_keywords(&mut self) -> Option<String> {
        self.ensure_fetched().await;
        self.document().and_then(FetchedDocument::meta_keywords)
    }

    /// Classification group, empty when the page declares none
    pub async fn group(&mut self) -> String {
        self.ensure_fetched().await;
        self.document()
            .map(|document| group(document, &self.context))
            .unwrap_or_default()
    }

    /// Sanitized index content, empty without a document
    pub async fn content(&mut self) -> String {
        self.ensure_fetched().await;
        self.document()
            .map(|document| content(document, &self.context))
            .unwrap_or_default()
    }

    /// Extracts every field at once
    pub async fn extract(&mut self) -> ExtractionResult {
        self.ensure_fetched().await;
        self.document()
            .map(|document| ExtractionResult::from_document(document, &self.context))
            .unwrap_or_default()
    }
}

fn title(document: &FetchedDocument, context: &PageContext) -> Option<String> {
    let body = document.body_html();

    if let Some(tag) = crawl_title(&body).filter(|tag| !tag.is_empty()) {
        context.diagnostic("[+] CRAWL_TITLE FOUND", tag);
        return Some(tag.to_string());
    }

    let title_tag = document.title_tag();
    context.diagnostic("? title(): title tag found", title_tag.as_deref().unwrap_or(""));

    if context.use_h1() {
        if let Some(h1) = document.first_h1().filter(|h1| !h1.is_empty()) {
            context.diagnostic("? title(): h1 tag found", &h1);
            return Some(h1);
        }
    }

    title_tag
}

fn group(document: &FetchedDocument, context: &PageContext) -> String {
    match crawl_group(&document.body_html()) {
        Some(group) => {
            context.diagnostic("[+] CRAWL_GROUP information found", group);
            group.to_string()
        }
        None => String::new(),
    }
}

/// Body text after control tags, followed by description, keywords and title tag
fn content(document: &FetchedDocument, context: &PageContext) -> String {
    context.diagnostic("get content for", context.page_url());

    let body = squash_whitespace(&document.body_html());

    let mut assembled = if has_full_ignore(&body) {
        context.diagnostic("Crawler tag found: CRAWL_FULL_IGNORE", context.page_url());
        String::new()
    } else {
        strip_ignored(&body).into_owned()
    };

    for part in [
        document.meta_description(),
        document.meta_keywords(),
        document.title_tag(),
    ]
    .into_iter()
    .flatten()
    {
        assembled.push_str(&part);
    }

    sanitize(&assembled)
}
