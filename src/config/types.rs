use serde::Deserialize;

/// User agent sent when no `[user-agent]` section is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_6_8) AppleWebKit/534.30 (KHTML, like Gecko) Chrome/12.0.742.112 Safari/534.30";

/// Extensions never followed by default
pub const DEFAULT_DO_NOT_FOLLOW: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "svg", "tiff", "tif", "eps", "bmp", "pdf", "doc", "docx", "xls",
    "xlsx", "ppt", "pptx", "csv", "zip",
];

/// Main configuration structure for Site-Indexer
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Root URL of the site; only links on its host are followed
    #[serde(default)]
    pub base_url: String,

    /// Use the first `<h1>` as title when it has text
    #[serde(default)]
    pub use_h1: bool,

    /// Log per-page extraction diagnostics
    #[serde(default)]
    pub verbose: bool,

    /// Number of pages fetched in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Maximum number of pages queued per run (0 = unlimited)
    #[serde(default)]
    pub max_pages: usize,

    /// Regular expressions rejecting matching URLs
    #[serde(default)]
    pub filter_regex: Vec<String>,

    /// Path extensions that are never followed
    #[serde(default = "default_do_not_follow")]
    pub do_not_follow_extensions: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            use_h1: false,
            verbose: false,
            concurrency: default_concurrency(),
            max_pages: 0,
            filter_regex: Vec::new(),
            do_not_follow_extensions: default_do_not_follow(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Full user agent header value
    #[serde(default = "default_user_agent")]
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite index database
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Number of results per search page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_concurrency() -> u32 {
    10
}

fn default_do_not_follow() -> Vec<String> {
    DEFAULT_DO_NOT_FOLLOW.iter().map(|ext| ext.to_string()).collect()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_page_size() -> u32 {
    25
}
