//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the MoldWeb index.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Hosts that have at least one indexed page
CREATE TABLE IF NOT EXISTS domains (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain TEXT NOT NULL UNIQUE
);

-- One row per canonical page URL
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL DEFAULT '',
    about TEXT NOT NULL DEFAULT '',
    about_source TEXT NOT NULL DEFAULT '',
    lang TEXT NOT NULL DEFAULT '',
    domain TEXT NOT NULL,
    depth INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_pages_domain ON pages(domain);

-- Inverted index: one row per scored word occurrence
CREATE TABLE IF NOT EXISTS inv_index (
    word TEXT NOT NULL,
    score INTEGER NOT NULL,
    url TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_inv_index_word ON inv_index(word);
CREATE INDEX IF NOT EXISTS idx_inv_index_url ON inv_index(url);

-- Links leaving the webring
CREATE TABLE IF NOT EXISTS external_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE
);

-- Date of the crawl this index was built from
CREATE TABLE IF NOT EXISTS crawl (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
