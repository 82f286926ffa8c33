use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use moldweb::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Parses a link and returns its lowercase hostname
pub fn hostname_of(link: &str) -> Option<String> {
    Url::parse(link).ok().as_ref().and_then(extract_domain)
}

/// Strips a leading `www.` so `www.example.com` and `example.com` compare equal
///
/// # Examples
///
/// ```
/// use moldweb::url::normalize_domain;
///
/// assert_eq!(normalize_domain("www.example.com"), "example.com");
/// assert_eq!(normalize_domain("blog.example.com"), "blog.example.com");
/// ```
pub fn normalize_domain(domain: &str) -> &str {
    domain.strip_prefix("www.").unwrap_or(domain)
}
