//! Integration tests for index building

use crate::common::{create_test_config, html};
use moldweb::config::Config;
use moldweb::crawler::{build_http_client, run_crawl};
use moldweb::ingest::run_ingest;
use moldweb::storage::SqliteIndexStore;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

const RECORDS: &str = "\
title Cat Facts https://a.example/ 2
desc All about cats https://a.example/ 2
h1 Cats https://a.example/ 2
non-webring-link https://elsewhere.net https://a.example 2
para-just-p ignored https://a.example 2
lang en https://a.example/ 2
title Garden https://b.example/pet-news 1
broken line
title Bad ftp://x.example 1
";

fn write_source(config: &Config, content: &str) {
    std::fs::write(&config.data.source, content).expect("Failed to write record file");
}

fn open_index(config: &Config) -> SqliteIndexStore {
    SqliteIndexStore::open(Path::new(&config.data.database)).expect("Failed to open index")
}

#[test]
fn test_ingest_builds_index() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), "");
    write_source(&config, RECORDS);

    let stats = run_ingest(&config, None).expect("Ingest failed");
    assert_eq!(stats.lines_read, 9);
    assert_eq!(stats.lines_skipped, 2);
    assert_eq!(stats.records_ignored, 1);
    assert_eq!(stats.flushes, 1);
    assert_eq!(stats.failed_flushes, 0);

    let store = open_index(&config);
    assert_eq!(store.count_pages().unwrap(), 2);
    assert_eq!(store.count_domains().unwrap(), 2);
    assert_eq!(store.count_external_links().unwrap(), 1);

    let page = store.get_page("https://a.example").unwrap().expect("Page missing");
    assert_eq!(page.title, "Cat Facts");
    assert_eq!(page.about, "All about cats");
    assert_eq!(page.about_source, "desc");
    assert_eq!(page.lang, "en");
    assert_eq!(page.domain, "a.example");
    assert_eq!(page.depth, 2);

    let words = store.get_words("https://a.example").unwrap();
    assert!(words.contains(&("cat".to_string(), 5)));
    assert!(words.contains(&("fact".to_string(), 5)));
    assert!(words.contains(&("cat".to_string(), 15)));

    assert_eq!(
        store.get_words("https://b.example/pet-news").unwrap(),
        vec![
            ("garden".to_string(), 5),
            ("pet".to_string(), 2),
            ("news".to_string(), 2)
        ]
    );

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    assert_eq!(store.crawl_date().unwrap(), Some(today));
}

#[test]
fn test_ingest_replaces_existing_index() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), "");
    std::fs::write(&config.data.database, b"not a database").expect("Failed to write file");
    write_source(&config, RECORDS);

    run_ingest(&config, None).expect("First ingest failed");
    write_source(&config, "title Only https://c.example 1\n");
    run_ingest(&config, None).expect("Second ingest failed");

    let store = open_index(&config);
    assert_eq!(store.count_pages().unwrap(), 1);
    assert!(store.get_page("https://a.example").unwrap().is_none());
}

#[test]
fn test_explicit_source_overrides_config() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), "");
    let other = temp_dir.path().join("other.txt");
    std::fs::write(&other, "title Other https://d.example 1\n").expect("Failed to write file");

    run_ingest(&config, Some(other.to_str().unwrap())).expect("Ingest failed");
    let page = open_index(&config).get_page("https://d.example").unwrap();
    assert!(page.is_some());
}

#[test]
fn test_missing_source_is_error() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), "");
    assert!(run_ingest(&config, None).is_err());
}

#[tokio::test]
async fn test_crawl_then_ingest() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html lang="en"><head><title>Moss Garden</title>
            <meta property="og:description" content="Notes on growing moss indoors">
            </head><body>
            <a href="/notes/terrariums.html">Terrariums</a>
            <a href="https://library.example/moss">Reading</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/notes/terrariums.html"))
        .respond_with(html(
            "<html><head><title>Terrariums</title></head><body><h1>Closed jars</h1></body></html>",
        ))
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), &format!("{} | 2\n", base_url));

    let client = build_http_client(&config).expect("Failed to build client");
    let file = std::fs::File::create(&config.data.source).expect("Failed to create output");
    run_crawl(&config, client, file).await.expect("Crawl failed");

    let stats = run_ingest(&config, None).expect("Ingest failed");
    assert_eq!(stats.lines_skipped, 0);

    let store = open_index(&config);
    assert_eq!(store.count_pages().unwrap(), 2);
    assert_eq!(store.count_external_links().unwrap(), 1);

    let home = store.get_page(&base_url).unwrap().expect("Home page missing");
    assert_eq!(home.title, "Moss Garden");
    assert_eq!(home.about, "Notes on growing moss indoors");
    assert_eq!(home.about_source, "og-desc");
    assert_eq!(home.depth, 2);

    let notes_url = format!("{}/notes/terrariums.html", base_url);
    let words = store.get_words(&notes_url).unwrap();
    assert!(words.contains(&("notes".to_string(), 2)));
    assert!(words.contains(&("terrariums".to_string(), 2)));
    assert!(words.contains(&("jar".to_string(), 15)));
}
