use crate::UrlError;
use url::Url;

/// Canonicalizes a raw link the way every component compares links
///
/// # Normalization Steps
///
/// 1. Drop everything from the first `#`
/// 2. Drop everything from the first `?`
/// 3. Trim surrounding whitespace
/// 4. Strip trailing slashes (and whitespace they exposed)
///
/// The result is a fixed point: applying `get_link` again returns it unchanged.
///
/// # Examples
///
/// ```
/// use moldweb::url::get_link;
///
/// assert_eq!(get_link(" https://example.com/page/?a=1#top "), "https://example.com/page");
/// assert_eq!(get_link("/about/"), "/about");
/// ```
pub fn get_link(target: &str) -> String {
    let target = target.split('#').next().unwrap_or_default();
    let target = target.split('?').next().unwrap_or_default();
    target
        .trim_start()
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace())
        .to_string()
}

/// Strips a trailing slash from a page URL, yielding the index key for a page
pub fn canonical_page_url(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

/// Resolves a canonicalized link against the page it was found on
///
/// Only http and https results are returned.
pub fn resolve_link(base: &Url, link: &str) -> Result<Url, UrlError> {
    let resolved = base
        .join(link)
        .map_err(|e| UrlError::Parse(format!("{}: {}", link, e)))?;

    match resolved.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    if resolved.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(resolved)
}
