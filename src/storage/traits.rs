//! Storage traits and error types
//!
//! This module defines the trait interface for index store backends and
//! associated error types.

use crate::ingest::{PageData, SearchFragment};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for index store implementations
///
/// Each call is applied on its own; a caller issuing several calls gets no
/// atomicity across them.
pub trait IndexStore {
    /// Records the hostname of every page
    fn insert_many_domains(&mut self, pages: &[PageData]) -> StorageResult<()>;

    /// Inserts pages, merging with pages already stored under the same URL
    fn insert_many_pages(&mut self, pages: &[PageData]) -> StorageResult<()>;

    /// Appends word fragments to the inverted index
    fn insert_many_words(&mut self, fragments: &[SearchFragment]) -> StorageResult<()>;

    /// Records links leaving the webring
    fn insert_many_external_links(&mut self, links: &[String]) -> StorageResult<()>;

    /// Sets the date of the crawl the index was built from
    fn update_crawl_date(&mut self, date: &str) -> StorageResult<()>;
}
