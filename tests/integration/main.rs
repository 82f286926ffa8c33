//! Integration tests for MoldWeb
//!
//! The crawl and precrawl tests run against wiremock servers; the ingest
//! tests build real SQLite indexes in temporary directories.

mod common;
mod crawl_tests;
mod ingest_tests;
