//! Per-page extraction context

use crate::ConfigError;
use url::Url;

/// Immutable configuration for extracting one page
///
/// The base host (`scheme://host[:port]`) is derived once from the base URL
/// and used to resolve host-less hrefs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    page_url: String,
    base_url: Url,
    base_host: String,
    use_h1: bool,
    verbose: bool,
}

impl PageContext {
    /// Creates a context for `page_url` on the site rooted at `base_url`
    ///
    /// # Returns
    ///
    /// * `Ok(PageContext)` - The base URL parsed and has a host
    /// * `Err(ConfigError)` - The base URL is empty, unparsable or host-less
    ///
    /// # Example
    ///
    /// ```
    /// use site_indexer::extract::PageContext;
    ///
    /// let context = PageContext::new("http://localhost:8080/docs/", "http://localhost:8080/").unwrap();
    /// assert_eq!(context.base_host(), "http://localhost:8080");
    /// ```
    pub fn new(base_url: &str, page_url: &str) -> Result<Self, ConfigError> {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }

        let parsed = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base URL '{}': {}", base_url, e)))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| ConfigError::InvalidUrl(format!("Base URL '{}' has no host", base_url)))?;

        let mut base_host = format!("{}://{}", parsed.scheme(), host);
        if let Some(port) = parsed.port() {
            base_host.push_str(&format!(":{}", port));
        }

        Ok(Self {
            page_url: page_url.to_string(),
            base_url: parsed,
            base_host,
            use_h1: false,
            verbose: false,
        })
    }

    /// Allows the first `<h1>` to stand in for the title tag
    pub fn with_use_h1(mut self, use_h1: bool) -> Self {
        self.use_h1 = use_h1;
        self
    }

    /// Enables per-page diagnostic logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Returns a copy of this context pointing at another page of the same site
    pub fn for_page(&self, page_url: &str) -> Self {
        Self {
            page_url: page_url.to_string(),
            ..self.clone()
        }
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn base_host(&self) -> &str {
        &self.base_host
    }

    pub fn use_h1(&self) -> bool {
        self.use_h1
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Emits a diagnostic event, promoted to `info` when verbose is enabled
    pub(crate) fn diagnostic(&self, key: &str, value: &str) {
        if self.verbose {
            tracing::info!(target: "site_indexer::extract", page = %self.page_url, "{}: {}", key, value);
        } else {
            tracing::trace!(target: "site_indexer::extract", page = %self.page_url, "{}: {}", key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_host_without_port() {
        let context = PageContext::new("https://example.com/some/path", "https://example.com/").unwrap();
        assert_eq!(context.base_host(), "https://example.com");
    }

    #[test]
    fn test_base_host_keeps_explicit_port() {
        let context = PageContext::new("http://127.0.0.1:3000", "http://127.0.0.1:3000/").unwrap();
        assert_eq!(context.base_host(), "http://127.0.0.1:3000");
    }

    #[test]
    fn test_missing_base_url() {
        let result = PageContext::new("", "http://localhost/");
        assert!(matches!(result, Err(ConfigError::MissingBaseUrl)));
    }

    #[test]
    fn test_unparsable_base_url() {
        let result = PageContext::new("not a url", "http://localhost/");
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_hostless_base_url() {
        let result = PageContext::new("mailto:someone", "http://localhost/");
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_for_page_keeps_settings() {
        let context = PageContext::new("http://localhost", "http://localhost/a")
            .unwrap()
            .with_use_h1(true)
            .with_verbose(true);

        let next = context.for_page("http://localhost/b");
        assert_eq!(next.page_url(), "http://localhost/b");
        assert_eq!(next.base_host(), "http://localhost");
        assert!(next.use_h1());
        assert!(next.verbose());
    }
}
