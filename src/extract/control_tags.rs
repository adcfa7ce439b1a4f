//! Control-tag mini-language embedded in page bodies
//!
//! Site authors can place bracketed markers inside the text of a page to steer
//! indexing. These are plain text, not HTML, so they are scanned on the raw
//! body markup before any DOM-based sanitizing:
//!
//! | Marker | Effect |
//! |--------|--------|
//! | `[CRAWL_FULL_IGNORE]` | the whole body text is dropped from the content |
//! | `[CRAWL_IGNORE]...[/CRAWL_IGNORE]` | the span, delimiters included, is removed |
//! | `[CRAWL_TITLE]...[/CRAWL_TITLE]` | the first span's inner text becomes the title |
//! | `[CRAWL_GROUP]...[/CRAWL_GROUP]` | the first span's inner text becomes the group |
//!
//! Matching is case-sensitive and non-greedy: a span always ends at the first
//! closing marker after its opening marker.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Marker that discards the entire body text of a page
pub const FULL_IGNORE: &str = "[CRAWL_FULL_IGNORE]";

// `.` stops at line breaks, so title and group values are single-line
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[CRAWL_TITLE\](.*?)\[/CRAWL_TITLE\]").expect("Failed to compile title regex")
});
static GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[CRAWL_GROUP\](.*?)\[/CRAWL_GROUP\]").expect("Failed to compile group regex")
});
static IGNORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[CRAWL_IGNORE\].*?\[/CRAWL_IGNORE\]")
        .expect("Failed to compile ignore regex")
});

/// Returns true when the body carries the full-ignore marker
pub fn has_full_ignore(body: &str) -> bool {
    body.contains(FULL_IGNORE)
}

/// Removes every `[CRAWL_IGNORE]` span, delimiters included
pub fn strip_ignored(body: &str) -> Cow<'_, str> {
    IGNORE_RE.replace_all(body, "")
}

/// Inner text of the first `[CRAWL_TITLE]` span
pub fn crawl_title(body: &str) -> Option<&str> {
    first_capture(&TITLE_RE, body)
}

/// Inner text of the first `[CRAWL_GROUP]` span
pub fn crawl_group(body: &str) -> Option<&str> {
    first_capture(&GROUP_RE, body)
}

fn first_capture<'a>(re: &Regex, body: &'a str) -> Option<&'a str> {
    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|inner| inner.as_str())
}
