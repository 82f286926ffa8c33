//! Crawl record line protocol
//!
//! The crawl engine writes one line per extracted fact:
//!
//! ```text
//! <token> <payload...> <url> <depth>
//! ```
//!
//! The payload may contain spaces (or be empty); the URL and depth are always
//! the last two space-separated fields. The ingester reads the same lines back
//! with [`CrawlRecord::parse_line`].

use crate::url::canonical_page_url;
use std::fmt;
use thiserror::Error;

/// Errors for lines that cannot be turned into a record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected at least 3 fields, got {0}")]
    TooFewFields(usize),

    #[error("page url '{0}' is not http(s)")]
    NotHttp(String),

    #[error("unknown record token '{0}'")]
    UnknownToken(String),
}

/// The kind of fact a record carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Title,
    H1,
    H2,
    H3,
    Desc,
    OgDesc,
    Para,
    ParaJustP,
    Lang,
    Keywords,
    NonWebringLink,
    WebringLink,
}

impl RecordKind {
    /// Returns the token written at the start of a line
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::Desc => "desc",
            Self::OgDesc => "og-desc",
            Self::Para => "para",
            Self::ParaJustP => "para-just-p",
            Self::Lang => "lang",
            Self::Keywords => "keywords",
            Self::NonWebringLink => "non-webring-link",
            Self::WebringLink => "webring-link",
        }
    }

    /// Parses a line token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "title" => Some(Self::Title),
            "h1" => Some(Self::H1),
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            "desc" => Some(Self::Desc),
            "og-desc" => Some(Self::OgDesc),
            "para" => Some(Self::Para),
            "para-just-p" => Some(Self::ParaJustP),
            "lang" => Some(Self::Lang),
            "keywords" => Some(Self::Keywords),
            "non-webring-link" => Some(Self::NonWebringLink),
            "webring-link" => Some(Self::WebringLink),
            _ => None,
        }
    }

    /// Returns all record kinds
    pub fn all() -> [Self; 12] {
        [
            Self::Title,
            Self::H1,
            Self::H2,
            Self::H3,
            Self::Desc,
            Self::OgDesc,
            Self::Para,
            Self::ParaJustP,
            Self::Lang,
            Self::Keywords,
            Self::NonWebringLink,
            Self::WebringLink,
        ]
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// One fact about one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRecord {
    pub kind: RecordKind,
    pub payload: String,
    pub url: String,
    pub depth: u32,
}

impl CrawlRecord {
    pub fn new(
        kind: RecordKind,
        payload: impl Into<String>,
        url: impl Into<String>,
        depth: u32,
    ) -> Self {
        Self {
            kind,
            payload: payload.into(),
            url: url.into(),
            depth,
        }
    }

    /// Parses a record line
    ///
    /// The URL is returned with its trailing slash stripped. A depth that does
    /// not parse as a number becomes 0.
    ///
    /// # Errors
    ///
    /// * `TooFewFields` - fewer than 3 space-separated fields
    /// * `NotHttp` - the URL field does not start with `http`
    /// * `UnknownToken` - the first field is not a known record kind
    pub fn parse_line(line: &str) -> Result<Self, RecordError> {
        let parts: Vec<&str> = line.split(' ').collect();
        let count = parts.len();
        if count < 3 {
            return Err(RecordError::TooFewFields(count));
        }

        let token = parts[0];
        let depth = parts[count - 1].parse().unwrap_or(0);
        let url = canonical_page_url(parts[count - 2]);
        let payload = parts[1..count - 2].join(" ");

        if !url.starts_with("http") {
            return Err(RecordError::NotHttp(url.to_string()));
        }

        let kind = RecordKind::from_token(token)
            .ok_or_else(|| RecordError::UnknownToken(token.to_string()))?;

        Ok(Self {
            kind,
            payload,
            url: url.to_string(),
            depth,
        })
    }
}

impl fmt::Display for CrawlRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            kind,
            payload,
            url,
            depth,
        } = self;
        write!(f, "{} {} {} {}", kind, payload, url, depth)
    }
}
