//! Link policy for the crawl engine
//!
//! Decides, for each link found on a page, whether it is screened out, how it
//! is logged (`non-webring-link` / `webring-link`), and whether it may be
//! enqueued under the pathsite rules.

use crate::config::{precrawl_depths, PolicyLists, WebringLink};
use crate::record::RecordKind;
use crate::url::{contains_any, get_link, has_banned_suffix, hostname_of, resolve_link};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Paths that do not restrict a webring member to a subtree
const ROOT_PATHS: &[&str] = &["", "/", "/index.html"];

/// Crawl-time link policy built from the webring list and policy lists
#[derive(Debug, Clone)]
pub struct CrawlPolicy {
    webring_domains: HashSet<String>,
    initial_host: Option<String>,
    banned_suffixes: Vec<String>,
    boring_domains: Vec<String>,
    boring_words: Vec<String>,
    pathsites: Vec<Url>,
    precrawl_depths: HashMap<String, u32>,
}

impl CrawlPolicy {
    /// Builds the policy
    ///
    /// `initial_url` is the bootstrap URL of the ring; links touching its host
    /// are never logged as `webring-link`.
    pub fn new(initial_url: &str, webring: &[WebringLink], lists: &PolicyLists) -> Self {
        let webring_domains = webring
            .iter()
            .filter_map(|link| link.hostname().map(str::to_string))
            .collect();

        let pathsites = webring
            .iter()
            .filter(|link| !ROOT_PATHS.contains(&link.url.path()))
            .map(|link| link.url.clone())
            .collect();

        Self {
            webring_domains,
            initial_host: hostname_of(initial_url),
            banned_suffixes: lists.banned_suffixes.clone(),
            boring_domains: lists.boring_domains.clone(),
            boring_words: lists.boring_words.clone(),
            pathsites,
            precrawl_depths: precrawl_depths(webring),
        }
    }

    /// Hostnames the crawl may fetch
    pub fn webring_domains(&self) -> impl Iterator<Item = &String> {
        self.webring_domains.iter()
    }

    /// Member URLs restricted to a path subtree
    pub fn pathsites(&self) -> &[Url] {
        &self.pathsites
    }

    /// Canonicalizes an `href` and resolves it against the page
    ///
    /// Returns `None` for links ending in a banned suffix and for links that
    /// do not resolve to an http(s) URL.
    pub fn screen_href(&self, href: &str, page_url: &Url) -> Option<Url> {
        let link = get_link(href);
        if has_banned_suffix(&link, &self.banned_suffixes) {
            return None;
        }
        resolve_link(page_url, &link).ok()
    }

    /// Decides which link record, if any, a discovered link produces
    pub fn classify_link(&self, link: &Url, current_host: &str) -> Option<RecordKind> {
        let raw = link.as_str();
        if contains_any(raw, &self.boring_words) || contains_any(raw, &self.boring_domains) {
            return None;
        }

        let outgoing_host = link.host_str()?;
        if !self.webring_domains.contains(outgoing_host) {
            return Some(RecordKind::NonWebringLink);
        }

        let initial = self.initial_host.as_deref();
        if outgoing_host != current_host
            && Some(outgoing_host) != initial
            && Some(current_host) != initial
        {
            return Some(RecordKind::WebringLink);
        }

        None
    }

    /// Applies the pathsite rule
    ///
    /// A link on a host with pathsites is admitted only if it starts with one
    /// of that host's pathsite URLs. Links on other hosts are always admitted;
    /// the scheduler applies the remaining checks.
    pub fn admits(&self, link: &Url) -> bool {
        let host = link.host_str();
        let mut same_host = self
            .pathsites
            .iter()
            .filter(|site| site.host_str() == host)
            .peekable();

        same_host.peek().is_none() || same_host.any(|site| link.as_str().starts_with(site.as_str()))
    }

    /// Precrawl depth of a host, 0 if the host is not a webring member
    pub fn depth_for(&self, host: &str) -> u32 {
        self.precrawl_depths.get(host).copied().unwrap_or(0)
    }
}
