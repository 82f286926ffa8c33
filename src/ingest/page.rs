use crate::record::RecordKind;
use crate::url::is_disallowed_phrase;

/// A preview paragraph must be longer than this to become a page's about text
const MIN_ABOUT_PARAGRAPH_LEN: usize = 20;

/// Per-page aggregate rebuilt from the record stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageData {
    /// Canonical URL (no trailing slash)
    pub url: String,
    /// Precrawl depth from the first record seen for this page
    pub depth: u32,
    pub title: String,
    pub about: String,
    /// Record kind the current about text came from
    pub about_source: Option<RecordKind>,
    pub lang: String,
    /// Whether the URL's path words were already indexed
    pub path_indexed: bool,
}

impl PageData {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
            ..Self::default()
        }
    }

    /// Applies one record's text to the title, language and about fields
    ///
    /// About-text precedence:
    ///
    /// | kind | replaces about when |
    /// |------|---------------------|
    /// | `title`, `h1` | about is empty |
    /// | `desc` | about is under 30 bytes, text is under 100 bytes and longer than about |
    /// | `og-desc` | always |
    /// | `para` | about did not come from `og-desc`, or text is over 70% of about's length; and text passes the heuristics |
    pub fn apply(&mut self, kind: RecordKind, text: &str, heuristics: &[String]) {
        match kind {
            RecordKind::Title => {
                if self.about.is_empty() {
                    self.set_about(kind, text);
                }
                self.title = text.to_string();
            }
            RecordKind::H1 if self.about.is_empty() => self.set_about(kind, text),
            RecordKind::Desc
                if self.about.len() < 30
                    && text.len() < 100
                    && text.len() > self.about.len() =>
            {
                self.set_about(kind, text)
            }
            RecordKind::OgDesc => self.set_about(kind, text),
            RecordKind::Para
                if (self.about_source != Some(RecordKind::OgDesc)
                    || text.len() * 10 > self.about.len() * 7)
                    && passes_about_heuristic(&text.to_lowercase(), heuristics) =>
            {
                self.set_about(kind, text)
            }
            RecordKind::Lang => self.lang = text.to_string(),
            _ => {}
        }
    }

    fn set_about(&mut self, kind: RecordKind, text: &str) {
        self.about = text.to_string();
        self.about_source = Some(kind);
    }
}

/// Rejects known boilerplate phrases and short paragraphs
pub fn passes_about_heuristic(phrase: &str, heuristics: &[String]) -> bool {
    !is_disallowed_phrase(phrase, heuristics) && phrase.len() > MIN_ABOUT_PARAGRAPH_LEN
}

/// Index score of the words of a record
pub fn score_for(kind: RecordKind) -> u32 {
    match kind {
        RecordKind::Title => 5,
        RecordKind::H1 | RecordKind::H2 | RecordKind::H3 => 15,
        _ => 1,
    }
}
