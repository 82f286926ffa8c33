use serde::Deserialize;

/// Main configuration structure for MoldWeb
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub general: GeneralConfig,
    pub crawler: CrawlerConfig,
    pub data: DataConfig,
}

/// Webring identity and outbound transport settings
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Human-readable webring name
    #[serde(default)]
    pub name: String,

    /// Bootstrap link graph document; its host is the initial domain
    pub url: String,

    /// Optional proxy applied to every outbound request
    #[serde(default)]
    pub proxy: String,
}

/// Crawler policy lists and rate limits
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Webring member list (`url | depth` per line)
    pub webring: String,

    #[serde(rename = "banned-domains")]
    pub banned_domains: String,

    #[serde(rename = "banned-suffixes")]
    pub banned_suffixes: String,

    #[serde(rename = "boring-domains")]
    pub boring_domains: String,

    #[serde(rename = "boring-words")]
    pub boring_words: String,

    /// Preview paragraph selectors; the built-in list is used when empty
    #[serde(rename = "preview-queries", default)]
    pub preview_queries: String,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum traversal depth; seed pages sit at depth 1
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of crawl workers
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,

    /// Maximum concurrent fetches against one host
    #[serde(rename = "domain-parallelism", default = "default_domain_parallelism")]
    pub domain_parallelism: u32,

    /// Minimum time between requests to the same host (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Frontier capacity; URLs beyond it are dropped
    #[serde(rename = "queue-capacity", default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Ingestion inputs and outputs
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Crawl output to ingest (`-` reads stdin)
    pub source: String,

    /// SQLite index database, recreated on every ingest
    pub database: String,

    /// Phrases that never qualify as a page summary
    pub heuristics: String,

    /// Pipe-delimited stopword list
    pub wordlist: String,
}

fn default_user_agent() -> String {
    "MoldWeb_crawler".to_string()
}

fn default_max_depth() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    5
}

fn default_domain_parallelism() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    200
}

fn default_queue_capacity() -> usize {
    100_000
}

fn default_request_timeout() -> u64 {
    30
}
