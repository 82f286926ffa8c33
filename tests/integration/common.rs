use moldweb::config::{Config, CrawlerConfig, DataConfig, GeneralConfig};
use std::path::Path;
use wiremock::ResponseTemplate;

/// Creates a test configuration whose list files live under `dir`
///
/// Every list file is written empty except the stopword and heuristics
/// lists; callers overwrite the files they care about.
pub fn create_test_config(dir: &Path, webring: &str) -> Config {
    let file = |name: &str, content: &str| {
        let path = dir.join(name);
        std::fs::write(&path, content).expect("Failed to write list file");
        path.to_string_lossy().into_owned()
    };

    Config {
        general: GeneralConfig {
            name: "Test Ring".to_string(),
            url: "https://ring.example/mushroom.json".to_string(),
            proxy: String::new(),
        },
        crawler: CrawlerConfig {
            webring: file("webring.txt", webring),
            banned_domains: file("banned-domains.txt", ""),
            banned_suffixes: file("banned-suffixes.txt", ".pdf\n.zip\n"),
            boring_domains: file("boring-domains.txt", ""),
            boring_words: file("boring-words.txt", ""),
            preview_queries: String::new(),
            user_agent: "TestBot".to_string(),
            max_depth: 3,
            parallelism: 2,
            domain_parallelism: 3,
            delay_ms: 0,
            queue_capacity: 1000,
            request_timeout_secs: 5,
        },
        data: DataConfig {
            source: dir.join("crawl.txt").to_string_lossy().into_owned(),
            database: dir.join("index.db").to_string_lossy().into_owned(),
            heuristics: file("heuristics.txt", "welcome to my website\n"),
            wordlist: file("wordlist.txt", "the|and|a|of|is"),
        },
    }
}

/// HTML response with the right content type
pub fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into().into_bytes(), "text/html")
}
