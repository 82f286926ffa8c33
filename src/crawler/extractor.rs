//! HTML content extraction
//!
//! This module turns a fetched HTML document into:
//! - The raw `href` of every link on the page
//! - The page facts written to the record stream (metadata, title, headings,
//!   and a preview paragraph picked by ordered heuristics)
//!
//! Selectors are compiled once when the [`Extractor`] is built.

use crate::record::RecordKind;
use crate::url::is_disallowed_phrase;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};

/// Upper bound (exclusive) on description and paragraph lengths
const MAX_TEXT_LEN: usize = 1500;

/// Lower bound (exclusive) on preview paragraph length
const MIN_PREVIEW_LEN: usize = 20;

/// Upper bound (exclusive) on the `lang` attribute length
const MAX_LANG_LEN: usize = 100;

/// Upper bound (exclusive) on heading length
const MAX_HEADING_LEN: usize = 500;

/// Only the first few matches of each preview query are considered
const PREVIEW_CANDIDATES: usize = 4;

/// Everything extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Raw `href` values in document order
    pub links: Vec<String>,

    /// Page facts in emission order
    pub facts: Vec<(RecordKind, String)>,
}

/// Compiled selectors for page extraction
#[derive(Debug)]
pub struct Extractor {
    links: Selector,
    keywords: Selector,
    description: Selector,
    og_description: Selector,
    lang: Selector,
    title: Selector,
    body: Selector,
    paragraph: Selector,
    headings: [(RecordKind, Selector); 3],
    preview_queries: Vec<Selector>,
    heuristics: Vec<String>,
}

impl Extractor {
    /// Compiles the fixed selectors and the configured preview queries
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidSelector` if a preview query is not a valid CSS
    /// selector.
    pub fn new(preview_queries: &[String], heuristics: &[String]) -> Result<Self, ConfigError> {
        let preview_queries = preview_queries
            .iter()
            .map(|query| compile(query))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            links: compile("a[href]")?,
            keywords: compile(r#"meta[name="keywords"]"#)?,
            description: compile(r#"meta[name="description"]"#)?,
            og_description: compile(r#"meta[property="og:description"]"#)?,
            lang: compile("html[lang]")?,
            title: compile("title")?,
            body: compile("body")?,
            paragraph: compile("p")?,
            headings: [
                (RecordKind::H1, compile("h1")?),
                (RecordKind::H2, compile("h2")?),
                (RecordKind::H3, compile("h3")?),
            ],
            preview_queries,
            heuristics: heuristics.to_vec(),
        })
    }

    /// Parses an HTML document and extracts its links and facts
    pub fn extract(&self, html: &str) -> ExtractedPage {
        let document = Html::parse_document(html);
        ExtractedPage {
            links: self.extract_hrefs(&document),
            facts: self.extract_facts(&document),
        }
    }

    /// Collects the raw `href` of every `a[href]`
    pub fn extract_hrefs(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.links)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect()
    }

    /// Collects the page facts in emission order
    pub fn extract_facts(&self, document: &Html) -> Vec<(RecordKind, String)> {
        let mut facts = Vec::new();

        for element in document.select(&self.keywords) {
            facts.push((RecordKind::Keywords, clean_text(attr(element, "content"))));
        }

        for (kind, selector) in [
            (RecordKind::Desc, &self.description),
            (RecordKind::OgDesc, &self.og_description),
        ] {
            for element in document.select(selector) {
                let text = clean_text(attr(element, "content"));
                if !text.is_empty() && text.len() < MAX_TEXT_LEN {
                    facts.push((kind, text));
                }
            }
        }

        for element in document.select(&self.lang) {
            let lang = clean_text(attr(element, "lang"));
            if !lang.is_empty() && lang.len() < MAX_LANG_LEN {
                facts.push((RecordKind::Lang, lang));
            }
        }

        for element in document.select(&self.title) {
            facts.push((RecordKind::Title, clean_text(&element_text(element))));
        }

        for body in document.select(&self.body) {
            self.extract_body(body, &mut facts);
        }

        facts
    }

    fn extract_body(&self, body: ElementRef<'_>, facts: &mut Vec<(RecordKind, String)>) {
        if let Some(preview) = self.find_preview(body) {
            facts.push((RecordKind::Para, preview));
        }

        if let Some(first) = body.select(&self.paragraph).next() {
            let text = clean_text(&element_text(first));
            if !text.is_empty() && text.len() < MAX_TEXT_LEN {
                facts.push((RecordKind::ParaJustP, text));
            }
        }

        for (kind, selector) in &self.headings {
            for heading in body.select(selector) {
                let text = element_text(heading);
                let text = text.trim();
                if text.len() < MAX_HEADING_LEN {
                    facts.push((*kind, clean_text(text)));
                }
            }
        }
    }

    /// Picks the first acceptable paragraph across the preview queries
    fn find_preview(&self, body: ElementRef<'_>) -> Option<String> {
        self.preview_queries.iter().find_map(|query| {
            body.select(query)
                .take(PREVIEW_CANDIDATES)
                .map(|element| clean_text(&element_text(element)))
                .find(|text| {
                    text.len() > MIN_PREVIEW_LEN
                        && text.len() < MAX_TEXT_LEN
                        && !is_disallowed_phrase(&text.to_lowercase(), &self.heuristics)
                })
        })
    }
}

/// Trims and collapses every whitespace run to a single space
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn compile(query: &str) -> Result<Selector, ConfigError> {
    Selector::parse(query).map_err(|_| ConfigError::InvalidSelector(query.to_string()))
}

fn attr<'a>(element: ElementRef<'a>, name: &str) -> &'a str {
    element.value().attr(name).unwrap_or("")
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}
