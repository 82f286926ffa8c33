//! Word tokenization for the index

use inflector::string::singularize::to_singular;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Punctuation, separators, control characters, symbols, `|` and `/`
const SEPARATOR_PATTERN: &str = r"[\p{P}\p{Z}\p{C}\p{S}|/]";

/// Splits text into normalized index words
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stopwords: HashSet<String>,
    separators: Regex,
}

impl Tokenizer {
    pub fn new(stopwords: &[String]) -> Result<Self, regex::Error> {
        Ok(Self {
            stopwords: stopwords.iter().cloned().collect(),
            separators: Regex::new(SEPARATOR_PATTERN)?,
        })
    }

    /// Lowercases, splits, filters and singularizes a text
    ///
    /// # Examples
    ///
    /// ```
    /// use moldweb::ingest::Tokenizer;
    ///
    /// let tokenizer = Tokenizer::new(&["the".to_string(), "are".to_string()]).unwrap();
    /// assert_eq!(tokenizer.tokenize("The Cats are Running"), vec!["cat", "running"]);
    /// ```
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.filter(self.partition(&text.to_lowercase()))
    }

    /// Splits on separators without changing case
    pub fn partition(&self, text: &str) -> Vec<String> {
        self.separators
            .replace_all(text, " ")
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Drops single-character words and stopwords, singularizing the rest
    pub fn filter(&self, words: Vec<String>) -> Vec<String> {
        words
            .into_iter()
            .filter(|word| word.chars().count() != 1 && !self.stopwords.contains(word))
            .map(|word| singularize(&word))
            .collect()
    }

    /// Splits a `keywords` payload on commas
    ///
    /// Entries keep their inner spaces; empty entries are dropped.
    pub fn keywords(&self, payload: &str) -> Vec<String> {
        let entries = payload
            .to_lowercase()
            .replace(", ", ",")
            .split(',')
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();
        self.filter(entries)
    }
}

/// Singularizes the last word of an entry; earlier words are kept as they are
fn singularize(entry: &str) -> String {
    match entry.rsplit_once(' ') {
        Some((head, last)) => format!("{} {}", head, to_singular(last)),
        None => to_singular(entry),
    }
}

/// Words taken from a page URL's path
///
/// The path is lowercased, a trailing `.html`/`.htm` is removed, and the rest
/// is split on `/`, `-` and `_`.
pub fn path_segments(page_url: &str) -> Vec<String> {
    let Ok(url) = Url::parse(&page_url.to_lowercase()) else {
        return Vec::new();
    };

    let path = url.path();
    let path = path.strip_suffix(".html").unwrap_or(path);
    let path = path.strip_suffix(".htm").unwrap_or(path);

    path.split(|c| matches!(c, '/' | '-' | '_'))
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| segment.trim().to_string())
        .collect()
}
