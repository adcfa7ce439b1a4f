//! Text sanitizer shared by every extractor
//!
//! Sanitizing runs three steps in order: markup is stripped down to its text
//! nodes, whitespace runs are collapsed into single spaces (and trimmed), and
//! the result is HTML-entity encoded so it can be stored and redisplayed.

use scraper::Html;

/// Strips markup, collapses whitespace and entity-encodes `raw`
///
/// Entities already present in `raw` are decoded by the HTML parser before
/// the final encoding pass, so sanitizing an already sanitized string yields
/// the same string again.
///
/// # Example
///
/// ```
/// use site_indexer::extract::sanitize;
///
/// assert_eq!(sanitize("<p>Fish   &amp;\n <b>Chips</b></p>"), "Fish &amp; Chips");
/// ```
pub fn sanitize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let text = strip_tags(raw);
    let collapsed = collapse_whitespace(&text);

    html_escape::encode_quoted_attribute(&collapsed).into_owned()
}

/// Removes all tags, keeping the text nodes concatenated in document order
pub fn strip_tags(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    fragment.root_element().text().collect()
}

/// Collapses every whitespace run into a single space and trims both ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replaces whitespace runs with a single space without trimming
///
/// Used on raw body markup before control tags are evaluated.
pub(crate) fn squash_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }

    out
}
