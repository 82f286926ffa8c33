use crate::config::types::{Config, CrawlerConfig, DataConfig, GeneralConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_general_config(&config.general)?;
    validate_crawler_config(&config.crawler)?;
    validate_data_config(&config.data)?;
    Ok(())
}

fn validate_general_config(config: &GeneralConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid general url '{}': {}", config.url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "general url '{}' must use http or https",
            config.url
        )));
    }

    if !config.proxy.is_empty() {
        Url::parse(&config.proxy)
            .map_err(|e| ConfigError::InvalidProxy(format!("'{}': {}", config.proxy, e)))?;
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    require_path("crawler.webring", &config.webring)?;
    require_path("crawler.banned-domains", &config.banned_domains)?;
    require_path("crawler.banned-suffixes", &config.banned_suffixes)?;
    require_path("crawler.boring-domains", &config.boring_domains)?;
    require_path("crawler.boring-words", &config.boring_words)?;

    if config.parallelism < 1 || config.parallelism > 100 {
        return Err(ConfigError::Validation(format!(
            "parallelism must be between 1 and 100, got {}",
            config.parallelism
        )));
    }

    if config.domain_parallelism < 1 || config.domain_parallelism > 100 {
        return Err(ConfigError::Validation(format!(
            "domain-parallelism must be between 1 and 100, got {}",
            config.domain_parallelism
        )));
    }

    if config.queue_capacity < 1 {
        return Err(ConfigError::Validation(
            "queue-capacity must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_data_config(config: &DataConfig) -> Result<(), ConfigError> {
    require_path("data.source", &config.source)?;
    require_path("data.database", &config.database)?;
    require_path("data.heuristics", &config.heuristics)?;
    require_path("data.wordlist", &config.wordlist)?;
    Ok(())
}

fn require_path(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
    }
    Ok(())
}
