//! MoldWeb: crawl-and-index core for a webring search engine
//!
//! This crate discovers webring members from a federated link graph, crawls
//! their pages under domain and path policies, and ingests the resulting
//! record stream into a SQLite word index.

pub mod config;
pub mod crawler;
pub mod ingest;
pub mod precrawl;
pub mod record;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Errors that abort a precrawl, crawl or ingest run
#[derive(Debug, Error)]
pub enum MoldError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} from {url}")]
    BadStatus { url: String, status: u16 },

    #[error("Failed to decode link graph node from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read list file {path}: {source}")]
    List {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid proxy URL: {0}")]
    InvalidProxy(String),

    #[error("Invalid preview selector '{0}'")]
    InvalidSelector(String),
}

/// Reasons a discovered link cannot be followed
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

// Re-export commonly used types
pub use config::{Config, PolicyLists};
pub use record::{CrawlRecord, RecordKind};
pub use url::{extract_domain, get_link, normalize_domain};
