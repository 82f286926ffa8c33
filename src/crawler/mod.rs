//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching through one shared client
//! - HTML extraction of links and page facts
//! - Link policy (suffixes, boring links, pathsites)
//! - Request scheduling and rate limiting
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod policy;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlStats};
pub use extractor::{clean_text, ExtractedPage, Extractor};
pub use fetcher::{build_http_client, fetch_page, is_usable_status, FetchResult};
pub use policy::CrawlPolicy;
pub use scheduler::{CrawlLimits, Dispatch, EnqueueOutcome, QueuedUrl, Scheduler};
