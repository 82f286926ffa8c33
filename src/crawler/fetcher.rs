//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the crawler and the link
//! graph walker, including:
//! - Building the one shared HTTP client (user agent, timeouts, proxy)
//! - GET requests for HTML pages
//! - Status and content-type filtering
//! - Error classification

use crate::config::Config;
use crate::{ConfigError, MoldError};
use reqwest::{redirect::Policy, Client, Proxy};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Status outside the accepted range
    RejectedStatus {
        /// The HTTP status code
        status_code: u16,
    },

    /// Page is not HTML (Content-Type mismatch)
    NotHtml {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Network error (connection refused, timeout, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Accepted page statuses: anything above 100 and below 400
pub fn is_usable_status(status_code: u16) -> bool {
    status_code > 100 && status_code < 400
}

/// Builds the HTTP client shared by every outbound request
///
/// The user agent, the per-request timeout and the optional proxy all come
/// from the configuration. The proxy, when set, applies to every scheme.
///
/// # Errors
///
/// * `ConfigError::InvalidProxy` - the proxy URL was rejected
/// * `MoldError::Reqwest` - the client could not be built
///
/// # Example
///
/// ```no_run
/// use moldweb::config::load_config;
/// use moldweb::crawler::build_http_client;
/// use std::path::Path;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, MoldError> {
    let timeout = Duration::from_secs(config.crawler.request_timeout_secs);

    let mut builder = Client::builder()
        .user_agent(config.crawler.user_agent.clone())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true);

    let proxy = config.general.proxy.trim();
    if !proxy.is_empty() {
        let proxy = Proxy::all(proxy)
            .map_err(|e| ConfigError::InvalidProxy(format!("{}: {}", proxy, e)))?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Fetches an HTML page
///
/// # Request Flow
///
/// 1. Send GET request, following redirects
/// 2. Reject statuses `<= 100` or `>= 400`
/// 3. Skip responses whose Content-Type is not HTML
/// 4. Read the body
///
/// Nothing is retried; a failure is reported and the page skipped.
pub async fn fetch_page(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(r) => r,
        Err(e) => return classify_error(e),
    };

    let status_code = response.status().as_u16();
    let final_url = response.url().clone();

    if !is_usable_status(status_code) {
        return FetchResult::RejectedStatus { status_code };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return FetchResult::NotHtml { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code,
            body,
        },
        Err(e) => classify_error(e),
    }
}

/// Treats a missing Content-Type as HTML
fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml")
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}
