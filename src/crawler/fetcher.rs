//! HTTP fetcher implementation
//!
//! This module provides the fetch collaborator used by the page facade:
//! - The [`Fetcher`] trait the facade is generic over
//! - An HTTP implementation on top of `reqwest`
//! - Classification of transport errors into [`FetchFailure`]

use crate::config::UserAgentConfig;
use crate::{FetchFailure, IndexerError};
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client, StatusCode};
use std::time::Duration;

/// Raw response handed to the page facade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value
    pub content_type: Option<String>,
    /// Page body content
    pub body: String,
}

/// Source of fetched pages
///
/// Implementations return either a response or a [`FetchFailure`]; they never
/// retry. The page facade treats any status other than 200 as a failure.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchFailure>;
}

impl<T: Fetcher> Fetcher for &T {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchFailure> {
        (**self).fetch(url).await
    }
}

/// Fetcher backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher sending the configured user agent
    ///
    /// # Example
    ///
    /// ```no_run
    /// use site_indexer::config::UserAgentConfig;
    /// use site_indexer::crawler::HttpFetcher;
    ///
    /// let fetcher = HttpFetcher::new(&UserAgentConfig::default()).unwrap();
    /// ```
    pub fn new(config: &UserAgentConfig) -> Result<Self, IndexerError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchFailure> {
        fetch_url(&self.client, url).await
    }
}

/// Builds an HTTP client with the crawler's user agent and timeouts
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.value.as_str())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a single GET request
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 200 | `Ok(FetchResponse)` |
/// | Other status | `Err(FetchFailure::Status)` |
/// | Timeout | `Err(FetchFailure::Timeout)` |
/// | Connection or TLS error | `Err(FetchFailure::Transport)` |
/// | Body not readable | `Err(FetchFailure::Body)` |
pub async fn fetch_url(client: &Client, url: &str) -> Result<FetchResponse, FetchFailure> {
    let response = client.get(url).send().await.map_err(classify_error)?;

    let status = response.status();
    if status != StatusCode::OK {
        tracing::debug!("{} responded with {}", url, status);
        return Err(FetchFailure::Status(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response
        .text()
        .await
        .map_err(|e| FetchFailure::Body(e.to_string()))?;

    Ok(FetchResponse {
        status: status.as_u16(),
        content_type,
        body,
    })
}

fn classify_error(error: reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            value: "TestIndexer/1.0".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&create_test_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_user_agent_is_http_error() {
        let config = UserAgentConfig {
            value: "broken\nagent".to_string(),
        };
        assert!(matches!(
            HttpFetcher::new(&config),
            Err(IndexerError::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", "TestIndexer/1.0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<html><title>Hi</title></html>", "text/html"),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&create_test_config()).unwrap();
        let response = fetcher.fetch(&format!("{}/page", server.uri())).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type.as_deref(), Some("text/html"));
        assert!(response.body.contains("<title>Hi</title>"));
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&create_test_config()).unwrap();
        let result = fetcher.fetch(&format!("{}/missing", server.uri())).await;

        assert_eq!(result, Err(FetchFailure::Status(404)));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let fetcher = HttpFetcher::new(&create_test_config()).unwrap();
        let result = fetcher.fetch("http://127.0.0.1:1/").await;

        assert!(matches!(result, Err(FetchFailure::Transport(_))));
    }
}
