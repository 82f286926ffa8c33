//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the IndexStore trait.
//! Every trait call runs in its own transaction.

use crate::ingest::{PageData, SearchFragment};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{IndexStore, StorageResult};
use crate::url::hostname_of;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// A page row as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPage {
    pub url: String,
    pub title: String,
    pub about: String,
    pub about_source: String,
    pub lang: String,
    pub domain: String,
    pub depth: u32,
}

/// SQLite index store
pub struct SqliteIndexStore {
    conn: Connection,
}

impl SqliteIndexStore {
    /// Opens (or creates) a database file and initializes the schema
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Removes any existing database file, then opens a fresh one
    pub fn create_fresh(path: &Path) -> StorageResult<Self> {
        if path.exists() {
            tracing::info!("Removing existing database {}", path.display());
            std::fs::remove_file(path)?;
        }
        Self::open(path)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn count_pages(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM pages")
    }

    pub fn count_words(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM inv_index")
    }

    pub fn count_domains(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM domains")
    }

    pub fn count_external_links(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM external_links")
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Gets a page by its canonical URL
    pub fn get_page(&self, url: &str) -> StorageResult<Option<StoredPage>> {
        let page = self
            .conn
            .query_row(
                "SELECT url, title, about, about_source, lang, domain, depth
                 FROM pages WHERE url = ?1",
                params![url],
                |row| {
                    Ok(StoredPage {
                        url: row.get(0)?,
                        title: row.get(1)?,
                        about: row.get(2)?,
                        about_source: row.get(3)?,
                        lang: row.get(4)?,
                        domain: row.get(5)?,
                        depth: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(page)
    }

    /// Gets the (word, score) pairs indexed for a URL, in insertion order
    pub fn get_words(&self, url: &str) -> StorageResult<Vec<(String, u32)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT word, score FROM inv_index WHERE url = ?1 ORDER BY rowid")?;
        let words = stmt
            .query_map(params![url], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(words)
    }

    /// Gets the recorded crawl date
    pub fn crawl_date(&self) -> StorageResult<Option<String>> {
        let date = self
            .conn
            .query_row("SELECT date FROM crawl WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        Ok(date)
    }
}

impl IndexStore for SqliteIndexStore {
    fn insert_many_domains(&mut self, pages: &[PageData]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached("INSERT OR IGNORE INTO domains (domain) VALUES (?1)")?;
            for page in pages {
                if let Some(domain) = hostname_of(&page.url) {
                    stmt.execute(params![domain])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn insert_many_pages(&mut self, pages: &[PageData]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            // Empty fields never overwrite what an earlier batch stored
            let mut stmt = tx.prepare_cached(
                "INSERT INTO pages (url, title, about, about_source, lang, domain, depth)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(url) DO UPDATE SET
                    title = COALESCE(NULLIF(excluded.title, ''), pages.title),
                    about = COALESCE(NULLIF(excluded.about, ''), pages.about),
                    about_source = CASE WHEN excluded.about = ''
                        THEN pages.about_source ELSE excluded.about_source END,
                    lang = COALESCE(NULLIF(excluded.lang, ''), pages.lang)",
            )?;
            for page in pages {
                stmt.execute(params![
                    page.url,
                    page.title,
                    page.about,
                    page.about_source.map(|k| k.as_token()).unwrap_or(""),
                    page.lang,
                    hostname_of(&page.url).unwrap_or_default(),
                    page.depth,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn insert_many_words(&mut self, fragments: &[SearchFragment]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO inv_index (word, score, url) VALUES (?1, ?2, ?3)")?;
            for fragment in fragments {
                stmt.execute(params![fragment.word, fragment.score, fragment.url])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn insert_many_external_links(&mut self, links: &[String]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT OR IGNORE INTO external_links (url) VALUES (?1)")?;
            for link in links {
                stmt.execute(params![link])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn update_crawl_date(&mut self, date: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO crawl (id, date) VALUES (1, ?1)",
            params![date],
        )?;
        Ok(())
    }
}
