//! Webring member list (`url | depth` per line)

use crate::ConfigError;
use std::collections::HashMap;
use url::Url;

/// Depth assigned to members whose depth field does not parse
const DEFAULT_DEPTH: u32 = 1;

/// A webring member with its precrawl depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebringLink {
    pub url: Url,
    pub depth: u32,
}

impl WebringLink {
    pub fn hostname(&self) -> Option<&str> {
        self.url.host_str()
    }
}

/// Parses one `url | depth` line
///
/// Lines without exactly one ` | ` separator or with an unparseable URL yield
/// `None`. A missing scheme defaults to https.
pub fn parse_webring_line(line: &str) -> Option<WebringLink> {
    let parts: Vec<&str> = line.split(" | ").collect();
    if parts.len() != 2 {
        return None;
    }

    let url_str = parts[0].trim();
    let depth_str = parts[1].trim();

    let url = if url_str.contains("://") {
        Url::parse(url_str)
    } else {
        Url::parse(&format!("https://{}", url_str))
    }
    .ok()?;

    url.host_str()?;

    let depth = depth_str.parse().unwrap_or(DEFAULT_DEPTH);
    Some(WebringLink { url, depth })
}

/// Parses a whole webring list, skipping lines that do not parse
pub fn parse_webring(content: &str) -> Vec<WebringLink> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let parsed = parse_webring_line(line);
            if parsed.is_none() {
                tracing::debug!("Skipping webring line: {}", line);
            }
            parsed
        })
        .collect()
}

/// Reads and parses the webring list file
///
/// # Errors
///
/// An unreadable file is a configuration error.
pub fn load_webring(path: &str) -> Result<Vec<WebringLink>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::List {
        path: path.to_string(),
        source,
    })?;
    Ok(parse_webring(&content))
}

/// Builds the hostname → precrawl depth map; the first entry for a host wins
pub fn precrawl_depths(links: &[WebringLink]) -> HashMap<String, u32> {
    let mut depths = HashMap::new();
    for link in links {
        if let Some(host) = link.hostname() {
            depths.entry(host.to_string()).or_insert(link.depth);
        }
    }
    depths
}
