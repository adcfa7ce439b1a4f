//! Link resolution for the crawl frontier
//!
//! Every anchor of a page is turned into an absolute URL:
//!
//! 1. hrefs containing `@` or starting with `tel:` are dropped
//! 2. host-less hrefs resolve against the context's base host, absolute hrefs
//!    against their own `scheme://host`
//! 3. each path segment is form-urlencoded on its own, keeping the `/`
//!    boundaries
//! 4. base and path are joined with exactly one slash, the query is kept and
//!    the fragment is always dropped
//!
//! Host-less relative paths resolve against the site root, not against the
//! directory of the current page.

use crate::extract::context::PageContext;
use crate::extract::document::FetchedDocument;
use crate::extract::sanitize::sanitize;
use crate::LinkError;
use serde::Serialize;
use url::{form_urlencoded, Url};

/// A resolved link: sanitized anchor text and absolute URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub text: String,
    pub url: String,
}

/// An anchor's raw href together with the URL computed from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub href: String,
    pub url: String,
}

/// Resolves every anchor of `document` in document order
///
/// Anchors that are rejected or malformed are skipped individually; the rest
/// of the page is still resolved.
pub fn resolve_links(document: &FetchedDocument, context: &PageContext) -> Vec<Link> {
    let mut links = Vec::new();

    for (text, href) in document.anchors() {
        context.diagnostic("find new link from page extraction", &href);

        match resolve_candidate(&href, context.base_host()) {
            Ok(candidate) => links.push(Link {
                text: sanitize(&text),
                url: candidate.url,
            }),
            Err(e) => {
                tracing::debug!(page = %context.page_url(), "Skipping link: {}", e);
            }
        }
    }

    links
}

/// Resolves a single href against `base_host`
///
/// # Returns
///
/// * `Ok(LinkCandidate)` - The href resolved to an absolute URL
/// * `Err(LinkError::Rejected)` - Mail or phone link
/// * `Err(LinkError::Malformed)` - The href or the joined URL can not be parsed
///
/// # Example
///
/// ```
/// use site_indexer::extract::resolve_candidate;
///
/// let candidate = resolve_candidate("/a b/c?x=1#top", "http://localhost").unwrap();
/// assert_eq!(candidate.url, "http://localhost/a+b/c?x=1");
/// ```
pub fn resolve_candidate(href: &str, base_host: &str) -> Result<LinkCandidate, LinkError> {
    if href.contains('@') || href.starts_with("tel:") {
        return Err(LinkError::Rejected(href.to_string()));
    }

    let parts = HrefParts::split(href);

    let base = match (parts.scheme, parts.authority) {
        (Some(scheme), Some(authority)) => {
            let host = host_of(authority).ok_or_else(|| LinkError::Malformed {
                href: href.to_string(),
                reason: "missing host".to_string(),
            })?;
            format!("{}://{}", scheme, host)
        }
        _ => base_host.to_string(),
    };

    let path = parts.path.map(encode_path).unwrap_or_default();
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );

    let mut url = Url::parse(&joined).map_err(|e| LinkError::Malformed {
        href: href.to_string(),
        reason: e.to_string(),
    })?;

    url.set_query(parts.query);
    url.set_fragment(None);

    Ok(LinkCandidate {
        href: href.to_string(),
        url: url.into(),
    })
}

/// Form-urlencodes each `/`-separated segment of `path`
///
/// Already percent-encoded input is encoded again (`%` becomes `%25`).
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| form_urlencoded::byte_serialize(segment.as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join("/")
}

/// Lenient split of an href into its components
#[derive(Debug, Default, PartialEq, Eq)]
struct HrefParts<'a> {
    scheme: Option<&'a str>,
    authority: Option<&'a str>,
    path: Option<&'a str>,
    query: Option<&'a str>,
}

impl<'a> HrefParts<'a> {
    fn split(href: &'a str) -> Self {
        let mut parts = HrefParts::default();

        let rest = match href.split_once('#') {
            Some((before, _fragment)) => before,
            None => href,
        };

        let mut rest = match rest.split_once('?') {
            Some((before, query)) => {
                parts.query = Some(query).filter(|q| !q.is_empty());
                before
            }
            None => rest,
        };

        if let Some(colon) = scheme_end(rest) {
            parts.scheme = Some(&rest[..colon]);
            rest = &rest[colon + 1..];
        }

        if let Some(after_slashes) = rest.strip_prefix("//") {
            let end = after_slashes.find('/').unwrap_or(after_slashes.len());
            parts.authority = Some(&after_slashes[..end]);
            rest = &after_slashes[end..];
        }

        if !rest.is_empty() || (parts.scheme.is_none() && parts.authority.is_none()) {
            parts.path = Some(rest);
        }

        parts
    }
}

/// Byte offset of the `:` ending a URI scheme, if `text` starts with one
fn scheme_end(text: &str) -> Option<usize> {
    let colon = text.find(':')?;
    let scheme = &text[..colon];
    let mut chars = scheme.chars();

    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    valid.then_some(colon)
}

/// Host part of an authority, without userinfo and port
fn host_of(authority: &str) -> Option<&str> {
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);

    let host = if host_port.starts_with('[') {
        let end = host_port.find(']')?;
        &host_port[..=end]
    } else {
        host_port.split(':').next().unwrap_or("")
    };

    (!host.is_empty()).then_some(host)
}
