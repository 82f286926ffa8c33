//! Configuration module for MoldWeb
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! file, and reading the policy lists and webring member list it points at.
//!
//! # Example
//!
//! ```no_run
//! use moldweb::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod lists;
mod parser;
mod types;
mod validation;
mod webring;

// Re-export types
pub use lists::{
    load_list, split_list, ListKind, ListOptions, PolicyLists, DEFAULT_PREVIEW_QUERIES,
};
pub use types::{Config, CrawlerConfig, DataConfig, GeneralConfig};
pub use webring::{
    load_webring, parse_webring, parse_webring_line, precrawl_depths, WebringLink,
};

// Re-export parser functions
pub use parser::{config_hash, load_config, load_config_with_hash, parse_config};
