use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Page-Indexer
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub elastic: ElasticConfig,

    #[serde(default)]
    pub log_level: LogLevel,

    /// Seed URLs for every crawl pass
    pub url_list: Vec<String>,

    /// Maximum number of in-flight page workers
    #[serde(default = "default_concurrent_tasks")]
    pub number_of_concurrent_tasks: u32,

    /// Maximum hop count from a seed URL
    #[serde(default = "default_search_depth")]
    pub maximum_search_depth: u32,

    /// Total fetch attempts per URL before it is abandoned
    #[serde(default = "default_fetch_attempts")]
    pub max_fetch_attempts: u32,

    /// Base delay before a failed URL is requeued (milliseconds)
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_millis: u64,

    /// Per-request timeout (seconds)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Pause between two crawl passes (seconds)
    #[serde(default)]
    pub pass_delay_seconds: u64,
}

/// Index store connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElasticConfig {
    pub uri: String,

    pub index_name: String,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// A bulk flush fires once more than this many pages are pending
    #[serde(default = "default_bulk_size")]
    pub bulk_size: u32,

    /// Append a `-dd-MM-yy` suffix of the flush date to the index name
    #[serde(default)]
    pub daily_index: bool,
}

/// Log verbosity, accepting both Serilog-style and tracing-style names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Verbose,
    #[default]
    Debug,
    Information,
    Warning,
    Error,
    Fatal,
}

impl LogLevel {
    /// Returns the `EnvFilter` directive for this level
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Verbose => "trace",
            Self::Debug => "debug",
            Self::Information => "info",
            Self::Warning => "warn",
            Self::Error | Self::Fatal => "error",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "verbose" | "trace" => Some(Self::Verbose),
            "debug" => Some(Self::Debug),
            "information" | "info" => Some(Self::Information),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "fatal" => Some(Self::Fatal),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        LogLevel::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown log level '{}'", name)))
    }
}

/// Parameters that stay fixed for the duration of one crawl pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    pub seed_urls: Vec<String>,
    pub max_concurrency: usize,
    pub max_depth: u32,
    pub bulk_size: usize,
}

/// Bounded retry policy for failed fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Delay after the first failure; doubled after each further failure
    pub base_backoff: Duration,

    /// Upper bound on any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_fetch_attempts(),
            base_backoff: Duration::from_millis(default_retry_backoff()),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Derives the per-pass crawl parameters
    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            seed_urls: self.url_list.clone(),
            max_concurrency: self.number_of_concurrent_tasks as usize,
            max_depth: self.maximum_search_depth,
            bulk_size: self.elastic.bulk_size as usize,
        }
    }

    /// Derives the retry policy for failed fetches
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_fetch_attempts,
            base_backoff: Duration::from_millis(self.retry_backoff_millis),
            ..RetryPolicy::default()
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }

    pub fn pass_delay(&self) -> Duration {
        Duration::from_secs(self.pass_delay_seconds)
    }
}

fn default_concurrent_tasks() -> u32 {
    20
}

fn default_search_depth() -> u32 {
    5
}

fn default_fetch_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    500
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_bulk_size() -> u32 {
    50
}

fn default_user_agent() -> String {
    format!("page-indexer/{}", env!("CARGO_PKG_VERSION"))
}
