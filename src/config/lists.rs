//! Policy list loading
//!
//! Every policy list is a plain text file with one entry per delimiter. A single
//! loader handles all of them; `ListKind` says where a list lives in the config
//! and how its file is split.

use crate::config::types::Config;
use crate::ConfigError;
use std::path::Path;

/// Preview selectors used when no preview query list is configured
pub const DEFAULT_PREVIEW_QUERIES: &[&str] = &["main p", "article p", "section p", "p"];

/// How a list file is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Entry separator
    pub delimiter: char,
    /// Lowercase every entry
    pub lowercase: bool,
    /// An empty path yields an empty list instead of an error
    pub optional: bool,
}

impl ListOptions {
    pub const LINES: Self = Self {
        delimiter: '\n',
        lowercase: false,
        optional: false,
    };

    pub const PIPES: Self = Self {
        delimiter: '|',
        lowercase: true,
        optional: false,
    };

    pub const fn lowercased(self) -> Self {
        Self {
            lowercase: true,
            ..self
        }
    }

    pub const fn optional(self) -> Self {
        Self {
            optional: true,
            ..self
        }
    }
}

/// Loads a delimited list file
///
/// Entries are trimmed and blank entries dropped.
///
/// # Errors
///
/// Returns `ConfigError::List` when the file cannot be read, and
/// `ConfigError::Validation` when a required list has no path.
pub fn load_list(path: &str, options: ListOptions) -> Result<Vec<String>, ConfigError> {
    if path.trim().is_empty() {
        if options.optional {
            return Ok(Vec::new());
        }
        return Err(ConfigError::Validation(
            "required list file path is empty".to_string(),
        ));
    }

    let content = std::fs::read_to_string(Path::new(path)).map_err(|source| ConfigError::List {
        path: path.to_string(),
        source,
    })?;

    Ok(split_list(&content, options))
}

/// Splits list content according to `options`
pub fn split_list(content: &str, options: ListOptions) -> Vec<String> {
    content
        .split(options.delimiter)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            if options.lowercase {
                entry.to_lowercase()
            } else {
                entry.to_string()
            }
        })
        .collect()
}

/// The policy lists known to the crawler and the ingester
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    BannedDomains,
    BannedSuffixes,
    BoringDomains,
    BoringWords,
    AboutHeuristics,
    PreviewQueries,
    Stopwords,
}

impl ListKind {
    /// Lists the crawl engine and link graph walker read
    pub const CRAWL: &'static [ListKind] = &[
        Self::BannedDomains,
        Self::BannedSuffixes,
        Self::BoringDomains,
        Self::BoringWords,
        Self::AboutHeuristics,
        Self::PreviewQueries,
    ];

    /// Lists the ingester reads
    pub const INGEST: &'static [ListKind] = &[Self::AboutHeuristics, Self::Stopwords];

    /// Config path for this list
    pub fn source(self, config: &Config) -> &str {
        match self {
            Self::BannedDomains => &config.crawler.banned_domains,
            Self::BannedSuffixes => &config.crawler.banned_suffixes,
            Self::BoringDomains => &config.crawler.boring_domains,
            Self::BoringWords => &config.crawler.boring_words,
            Self::AboutHeuristics => &config.data.heuristics,
            Self::PreviewQueries => &config.crawler.preview_queries,
            Self::Stopwords => &config.data.wordlist,
        }
    }

    pub fn options(self) -> ListOptions {
        match self {
            Self::BannedSuffixes | Self::AboutHeuristics => ListOptions::LINES.lowercased(),
            Self::PreviewQueries => ListOptions::LINES.optional(),
            Self::Stopwords => ListOptions::PIPES,
            _ => ListOptions::LINES,
        }
    }
}

/// Immutable policy lists for one run
#[derive(Debug, Clone, Default)]
pub struct PolicyLists {
    pub banned_domains: Vec<String>,
    pub banned_suffixes: Vec<String>,
    pub boring_domains: Vec<String>,
    pub boring_words: Vec<String>,
    pub about_heuristics: Vec<String>,
    pub preview_queries: Vec<String>,
    pub stopwords: Vec<String>,
}

impl PolicyLists {
    /// Loads the requested lists from the paths named in `config`
    ///
    /// Lists not requested stay empty, except the preview queries which fall
    /// back to [`DEFAULT_PREVIEW_QUERIES`].
    ///
    /// # Errors
    ///
    /// Any unreadable list is a configuration error.
    pub fn load(config: &Config, kinds: &[ListKind]) -> Result<Self, ConfigError> {
        let mut lists = Self::default();
        for &kind in kinds {
            let entries = load_list(kind.source(config), kind.options())?;
            tracing::debug!("Loaded {} entries for {:?}", entries.len(), kind);
            *lists.slot_mut(kind) = entries;
        }
        lists.apply_defaults();
        Ok(lists)
    }

    pub fn get(&self, kind: ListKind) -> &[String] {
        match kind {
            ListKind::BannedDomains => &self.banned_domains,
            ListKind::BannedSuffixes => &self.banned_suffixes,
            ListKind::BoringDomains => &self.boring_domains,
            ListKind::BoringWords => &self.boring_words,
            ListKind::AboutHeuristics => &self.about_heuristics,
            ListKind::PreviewQueries => &self.preview_queries,
            ListKind::Stopwords => &self.stopwords,
        }
    }

    fn slot_mut(&mut self, kind: ListKind) -> &mut Vec<String> {
        match kind {
            ListKind::BannedDomains => &mut self.banned_domains,
            ListKind::BannedSuffixes => &mut self.banned_suffixes,
            ListKind::BoringDomains => &mut self.boring_domains,
            ListKind::BoringWords => &mut self.boring_words,
            ListKind::AboutHeuristics => &mut self.about_heuristics,
            ListKind::PreviewQueries => &mut self.preview_queries,
            ListKind::Stopwords => &mut self.stopwords,
        }
    }

    fn apply_defaults(&mut self) {
        if self.preview_queries.is_empty() {
            self.preview_queries = DEFAULT_PREVIEW_QUERIES
                .iter()
                .map(|q| q.to_string())
                .collect();
        }
    }
}
