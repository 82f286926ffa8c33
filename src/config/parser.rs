use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates a configuration file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use moldweb::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Bootstrap document: {}", config.general.url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// Loads a configuration together with the SHA-256 of its text
///
/// The hash is logged at startup so crawl and ingest runs can be matched to
/// the configuration that produced them.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, config_hash(&content)))
}

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 of the configuration text
pub fn config_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
