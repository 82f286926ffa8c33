//! Storage module for the search index
//!
//! This module handles all database operations for ingestion, including:
//! - SQLite database initialization and schema management
//! - Domain, page and external link persistence
//! - The word index
//! - The crawl date

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{SqliteIndexStore, StoredPage};
pub use traits::{IndexStore, StorageError, StorageResult};
