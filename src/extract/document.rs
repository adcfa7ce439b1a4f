//! Parsed page document and metadata extraction
//!
//! A [`FetchedDocument`] wraps the DOM of one fetched page. Script elements
//! are removed right after parsing, so every extractor works on the same
//! script-free tree. All accessors degrade to `None` when the expected node
//! is missing.

use crate::extract::sanitize::{collapse_whitespace, sanitize};
use scraper::{Html, Selector};

/// DOM handle for one fetched page
#[derive(Debug)]
pub struct FetchedDocument {
    html: Html,
    content_type: Option<String>,
}

impl FetchedDocument {
    /// Parses a response body into a document
    ///
    /// # Arguments
    ///
    /// * `body` - Raw HTML of the page
    /// * `content_type` - Value of the response `Content-Type` header
    pub fn parse(body: &str, content_type: Option<String>) -> Self {
        let mut html = Html::parse_document(body);
        remove_scripts(&mut html);

        Self { html, content_type }
    }

    /// The response `Content-Type` header, if the server sent one
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Inner HTML of `<body>`, or an empty string without a body
    pub fn body_html(&self) -> String {
        select_first(&self.html, "body")
            .map(|body| body.inner_html())
            .unwrap_or_default()
    }

    /// Text of the `<title>` element, whitespace-normalized
    ///
    /// Returns `None` when the element is missing or empty.
    pub fn title_tag(&self) -> Option<String> {
        let title = select_first(&self.html, "title")?;
        let text = collapse_whitespace(&title.text().collect::<String>());

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Sanitized text of the first `<h1>` that has any text
    pub fn first_h1(&self) -> Option<String> {
        let selector = Selector::parse("h1").ok()?;

        self.html
            .select(&selector)
            .map(|heading| heading.text().collect::<String>())
            .find(|text| !text.trim().is_empty())
            .map(|text| sanitize(&text))
    }

    /// `lang` attribute of the root `<html>` element
    pub fn language(&self) -> Option<String> {
        self.html
            .root_element()
            .value()
            .attr("lang")
            .map(str::to_string)
    }

    /// Sanitized `content` of the first `<meta name="description">`
    pub fn meta_description(&self) -> Option<String> {
        self.meta_content("description").map(|content| sanitize(&content))
    }

    /// `content` of the first `<meta name="keywords">` with commas turned into spaces
    ///
    /// The value is not entity-encoded.
    pub fn meta_keywords(&self) -> Option<String> {
        self.meta_content("keywords")
            .map(|content| content.replace(',', " "))
    }

    /// `(text, href)` of every anchor in document order
    ///
    /// Anchors without an `href` report an empty one.
    pub fn anchors(&self) -> Vec<(String, String)> {
        let Ok(selector) = Selector::parse("a") else {
            return Vec::new();
        };

        self.html
            .select(&selector)
            .map(|anchor| {
                let text = anchor.text().collect::<String>();
                let href = anchor.value().attr("href").unwrap_or("").to_string();
                (text, href)
            })
            .collect()
    }

    fn meta_content(&self, name: &str) -> Option<String> {
        let selector = Selector::parse(&format!(r#"meta[name="{}"]"#, name)).ok()?;

        self.html
            .select(&selector)
            .next()
            .map(|meta| meta.value().attr("content").unwrap_or("").to_string())
    }
}

fn select_first<'a>(html: &'a Html, selector: &str) -> Option<scraper::ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    html.select(&selector).next()
}

/// Detaches every `<script>` element from the tree
fn remove_scripts(html: &mut Html) {
    let Ok(selector) = Selector::parse("script") else {
        return;
    };

    let ids: Vec<_> = html.select(&selector).map(|script| script.id()).collect();

    for id in ids {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
}
