use serde::Deserialize;

/// Main configuration structure for Route-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Base URL of the route listings; relative links resolve against it
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Number of parsed areas to accumulate before a batch is delivered
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Stop crawling once this many areas were emitted
    #[serde(rename = "max-results", default)]
    pub max_results: Option<usize>,

    /// Number of fetched pages kept in the recency cache
    #[serde(rename = "cache-size", default = "default_cache_size")]
    pub cache_size: usize,

    /// Number of oldest pages evicted when the cache overflows
    #[serde(rename = "cache-trim", default = "default_cache_trim")]
    pub cache_trim: usize,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root folder of the staged area/sector/route layout
    #[serde(rename = "staging-dir")]
    pub staging_dir: String,

    /// Path to the crawl checkpoint document
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,

    /// Path to the SQLite database the ingest pass writes into
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Where sector images are published during ingest
    #[serde(rename = "images-dir", default)]
    pub images_dir: Option<String>,
}

/// Retry policy for file-system operations
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per operation
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Fixed delay between attempts (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_batch_size() -> usize {
    10
}

fn default_cache_size() -> usize {
    100
}

fn default_cache_trim() -> usize {
    30
}

fn default_attempts() -> u32 {
    5
}

fn default_delay_ms() -> u64 {
    100
}
