//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end. Every mock server listens on 127.0.0.1,
//! so all pages of a test share one webring host.

use crate::common::{create_test_config, html};
use moldweb::config::Config;
use moldweb::crawler::{build_http_client, run_crawl, CrawlStats};
use std::collections::HashSet;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn crawl(config: &Config) -> (Vec<String>, CrawlStats) {
    let client = build_http_client(config).expect("Failed to build client");
    let (out, stats) = run_crawl(config, client, Vec::new())
        .await
        .expect("Crawl failed");
    let text = String::from_utf8(out).expect("Output is not UTF-8");
    (text.lines().map(str::to_string).collect(), stats)
}

/// Page URL field of a record line
fn page_of(line: &str) -> &str {
    line.rsplitn(3, ' ').nth(1).unwrap_or_default()
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html lang="en"><head><title>Home</title>
            <meta name="description" content="A small home page">
            </head><body>
            <a href="{}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="https://outside.example/x">Elsewhere</a>
            <a href="/files/report.pdf">Report</a>
            </body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(
            "<html><head><title>Page 1</title></head><body><h2>Gardening</h2></body></html>",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html("<html><head><title>Page 2</title></head><body></body></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/report.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), &format!("{}/ | 2\n", base_url));
    let (lines, stats) = crawl(&config).await;

    let root = format!("{}/", base_url);
    assert!(lines.contains(&format!("title Home {} 2", root)));
    assert!(lines.contains(&format!(
        "desc A small home page {} 2",
        root
    )));
    assert!(lines.contains(&format!("lang en {} 2", root)));
    assert!(lines.contains(&format!(
        "non-webring-link https://outside.example/x {} 2",
        root
    )));
    assert!(lines.contains(&format!(
        "title Page 1 {}/page1 2",
        base_url
    )));
    assert!(lines.contains(&format!(
        "h2 Gardening {}/page1 2",
        base_url
    )));
    assert!(lines.contains(&format!(
        "title Page 2 {}/page2 2",
        base_url
    )));

    // Same-host links are not logged
    assert!(!lines.iter().any(|l| l.starts_with("webring-link")));
    assert!(!lines.iter().any(|l| l.contains("report.pdf")));

    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.records_emitted, lines.len());
}

#[tokio::test]
async fn test_page_records_are_contiguous() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let mut links = String::new();
    for i in 0..8 {
        links.push_str(&format!(r#"<a href="/p{}">p</a>"#, i));
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html(format!(
                "<html><head><title>Page {}</title><meta name=\"keywords\" content=\"a, b\"></head>\
                 <body><h1>Heading {}</h1><p>Some paragraph text for page {}</p></body></html>",
                i, i, i
            )))
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            "<html><head><title>Index</title></head><body>{}</body></html>",
            links
        )))
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = create_test_config(temp_dir.path(), &format!("{} | 1\n", base_url));
    config.crawler.parallelism = 4;
    let (lines, _) = crawl(&config).await;

    let mut runs: Vec<&str> = lines.iter().map(|l| page_of(l)).collect();
    runs.dedup();
    let pages: HashSet<&str> = runs.iter().copied().collect();

    assert_eq!(pages.len(), 9);
    assert_eq!(
        runs.len(),
        pages.len(),
        "records of a page are split: {:?}",
        runs
    );
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="/a">a</a>
            <a href="/a/">a slash</a>
            <a href="/a?ref=home">a query</a>
            <a href="/a#top">a fragment</a>
            <a href="{}/">home</a>
            </body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(format!(
            r#"<html><head><title>A</title></head><body>
            <a href="{}">home</a><a href="/a">self</a>
            </body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), &format!("{} | 1\n", base_url));
    let (lines, stats) = crawl(&config).await;

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(lines.iter().filter(|l| l.starts_with("title ")).count(), 2);
}

#[tokio::test]
async fn test_max_depth_bounds_traversal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let chain = [("/", "/d2"), ("/d2", "/d3"), ("/d3", "/d4")];
    for (page, next) in chain {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html(format!(
                r#"<html><head><title>{}</title></head><body><a href="{}">next</a></body></html>"#,
                page, next
            )))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/d4"))
        .respond_with(html("<html><head><title>Too deep</title></head></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), &format!("{} | 1\n", base_url));
    let (lines, stats) = crawl(&config).await;

    assert_eq!(stats.pages_fetched, 3);
    assert!(!lines.iter().any(|l| l.contains("Too deep")));
}

#[tokio::test]
async fn test_pathsite_containment() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/~lupin"))
        .respond_with(html(
            r#"<html><head><title>Lupin</title></head><body>
            <a href="/~lupin/garden">inside</a>
            <a href="/~other/page">neighbour</a>
            <a href="/">server root</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/~lupin/garden"))
        .respond_with(html("<html><head><title>Garden</title></head></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    for outside in ["/~other/page", "/"] {
        Mock::given(method("GET"))
            .and(path(outside))
            .respond_with(html("<html><head><title>Outside</title></head></html>"))
            .expect(0)
            .mount(&mock_server)
            .await;
    }

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), &format!("{}/~lupin | 1\n", base_url));
    let (lines, stats) = crawl(&config).await;

    assert_eq!(stats.pages_fetched, 2);
    assert!(lines.contains(&format!(
        "title Garden {}/~lupin/garden 1",
        base_url
    )));
}

#[tokio::test]
async fn test_redirect_out_of_pathsite_dropped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/~lupin"))
        .respond_with(html(
            r#"<html><head><title>Lupin</title></head><body>
            <a href="/~lupin/moved">moved</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/~lupin/moved"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/private/secret"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html(
            r#"<html><head><title>Secret</title></head><body>
            <a href="/private/more">more</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private/more"))
        .respond_with(html("<html><head><title>More</title></head></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), &format!("{}/~lupin | 1\n", base_url));
    let (lines, stats) = crawl(&config).await;

    assert!(lines.contains(&format!(
        "title Lupin {}/~lupin 1",
        base_url
    )));
    assert!(!lines.iter().any(|l| l.contains("/private/")));
    assert_eq!(stats.pages_fetched, 1);
    assert_eq!(stats.pages_skipped, 1);
}

#[tokio::test]
async fn test_redirect_to_banned_host_dropped() {
    let mock_server = MockServer::start().await;
    let port = mock_server.address().port();
    let member = format!("http://localhost:{}", port);

    // The member is reached as localhost; the redirect lands on 127.0.0.1
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><title>Home</title></head><body><a href="/go">go</a></body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let landing = format!("http://127.0.0.1:{}/landing", port);
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", landing.as_str()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(html(
            r#"<html><head><title>Landing</title></head><body>
            <a href="/next">next</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html("<html><head><title>Next</title></head></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), &format!("{}/ | 1\n", member));
    std::fs::write(&config.crawler.banned_domains, "127.0.0.1\n").expect("Failed to write list");
    let (lines, stats) = crawl(&config).await;

    assert!(lines.contains(&format!("title Home {}/ 1", member)));
    let leaked = lines
        .iter()
        .any(|l| l.contains("Landing") || l.contains("127.0.0.1"));
    assert!(!leaked);
    assert_eq!(stats.pages_fetched, 1);
    assert_eq!(stats.pages_skipped, 1);
}

#[tokio::test]
async fn test_rejected_status_and_non_html_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><title>Home</title></head><body>
            <a href="/missing">gone</a>
            <a href="/broken">broken</a>
            <a href="/image">picture</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_raw("<title>Not found</title>", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/image"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), &format!("{} | 1\n", base_url));
    let (lines, stats) = crawl(&config).await;

    assert_eq!(stats.pages_fetched, 1);
    assert_eq!(stats.pages_skipped, 3);
    assert!(lines.iter().all(|l| page_of(l) == format!("{}/", base_url)));
}

#[tokio::test]
async fn test_redirect_records_use_final_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><title>Home</title></head><body><a href="/old">old</a></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html(
            r#"<html><head><title>New</title></head><body><a href="/new">self</a></body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), &format!("{} | 1\n", base_url));
    let (lines, _) = crawl(&config).await;

    assert!(lines.contains(&format!("title New {}/new 1", base_url)));
    assert!(!lines.iter().any(|l| l.contains("/old")));
}

#[tokio::test]
async fn test_banned_domain_not_crawled() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(html("<html><head><title>Home</title></head></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path(), &format!("{} | 1\n", base_url));
    std::fs::write(&config.crawler.banned_domains, "127.0.0.1\n").expect("Failed to write list");
    let (lines, stats) = crawl(&config).await;

    assert!(lines.is_empty());
    assert_eq!(stats.pages_fetched, 0);
}

#[tokio::test]
async fn test_missing_webring_file_is_error() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = create_test_config(temp_dir.path(), "");
    config.crawler.webring = temp_dir.path().join("absent.txt").to_string_lossy().into_owned();

    let client = build_http_client(&config).expect("Failed to build client");
    assert!(run_crawl(&config, client, Vec::new()).await.is_err());
}
