//! Batched writes to the index store

use crate::ingest::page::PageData;
use crate::storage::{IndexStore, StorageResult};
use std::collections::HashMap;
use std::mem;

/// A flush happens once more than this many pages are buffered
pub const PAGE_BATCH_THRESHOLD: usize = 100;

/// Maximum fragments per word insert
pub const WORD_CHUNK_SIZE: usize = 3000;

/// One scored word occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFragment {
    pub word: String,
    pub url: String,
    pub score: u32,
}

impl SearchFragment {
    pub fn new(word: impl Into<String>, url: impl Into<String>, score: u32) -> Self {
        Self {
            word: word.into(),
            url: url.into(),
            score,
        }
    }
}

/// Buffers pages, fragments and external links, writing them in batches
///
/// A flush writes domains, pages, words (in chunks) and external links with
/// separate store calls. The buffers are cleared whether or not the writes
/// succeed.
pub struct BatchCommitter<S: IndexStore> {
    store: S,
    pages: HashMap<String, PageData>,
    fragments: Vec<SearchFragment>,
    external_links: Vec<String>,
    flushes: usize,
}

impl<S: IndexStore> BatchCommitter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            pages: HashMap::new(),
            fragments: Vec::new(),
            external_links: Vec::new(),
            flushes: 0,
        }
    }

    /// Gets the buffered page for a URL, creating it with `depth` if absent
    pub fn page_mut(&mut self, url: &str, depth: u32) -> &mut PageData {
        self.pages
            .entry(url.to_string())
            .or_insert_with(|| PageData::new(url, depth))
    }

    pub fn add_fragments(&mut self, fragments: impl IntoIterator<Item = SearchFragment>) {
        self.fragments.extend(fragments);
    }

    pub fn add_external_link(&mut self, link: impl Into<String>) {
        self.external_links.push(link.into());
    }

    /// Whether the page buffer has passed the batch threshold
    pub fn should_flush(&self) -> bool {
        self.pages.len() > PAGE_BATCH_THRESHOLD
    }

    /// Writes and clears all buffers
    ///
    /// # Errors
    ///
    /// Returns the first failing store call; the calls after it are not made.
    pub fn flush(&mut self) -> StorageResult<()> {
        let mut pages: Vec<PageData> = mem::take(&mut self.pages).into_values().collect();
        pages.sort_by(|a, b| a.url.cmp(&b.url));
        let fragments = mem::take(&mut self.fragments);
        let links = mem::take(&mut self.external_links);
        self.flushes += 1;

        tracing::info!(
            "Ingesting batch {} (pages: {}, words: {}, links: {})",
            self.flushes,
            pages.len(),
            fragments.len(),
            links.len()
        );

        self.store.insert_many_domains(&pages)?;
        self.store.insert_many_pages(&pages)?;
        for chunk in fragments.chunks(WORD_CHUNK_SIZE) {
            self.store.insert_many_words(chunk)?;
        }
        self.store.insert_many_external_links(&links)?;

        tracing::debug!("Finished ingesting batch {}", self.flushes);
        Ok(())
    }

    /// Number of flushes started so far
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn buffered_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn fragments(&self) -> &[SearchFragment] {
        &self.fragments
    }

    pub fn external_links(&self) -> &[String] {
        &self.external_links
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
