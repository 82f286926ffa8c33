//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Seeding the frontier with the webring members
//! - A pool of workers sharing one scheduler
//! - Fetching, extraction and link handling for each page
//! - Writing each page's records to the output, one page at a time

use crate::config::{load_webring, Config, ListKind, PolicyLists, WebringLink};
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::crawler::policy::CrawlPolicy;
use crate::crawler::scheduler::{CrawlLimits, Dispatch, EnqueueOutcome, QueuedUrl, Scheduler};
use crate::record::{CrawlRecord, RecordKind};
use crate::url::extract_domain;
use crate::MoldError;
use reqwest::Client;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use url::Url;

/// Pages between progress log lines
const PROGRESS_INTERVAL: usize = 100;

/// Counters reported at the end of a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub pages_fetched: usize,
    pub pages_skipped: usize,
    pub pages_failed: usize,
    pub records_emitted: usize,
    pub urls_dropped: usize,
}

/// What happened to one dispatched URL
#[derive(Debug)]
enum PageOutcome {
    Crawled(Vec<CrawlRecord>),
    Skipped,
    Failed,
}

/// State shared by every worker
struct CrawlContext {
    client: Client,
    policy: CrawlPolicy,
    extractor: Extractor,
    scheduler: Mutex<Scheduler>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    context: Arc<CrawlContext>,
    seeds: Vec<Url>,
    parallelism: usize,
}

impl Coordinator {
    /// Creates a new coordinator from already-loaded inputs
    ///
    /// # Errors
    ///
    /// Fails if a preview query is not a valid CSS selector.
    pub fn new(
        config: &Config,
        client: Client,
        webring: &[WebringLink],
        lists: &PolicyLists,
    ) -> Result<Self, MoldError> {
        let policy = CrawlPolicy::new(&config.general.url, webring, lists);
        let extractor = Extractor::new(&lists.preview_queries, &lists.about_heuristics)?;

        let scheduler = Scheduler::new(
            CrawlLimits::from(&config.crawler),
            policy.webring_domains().cloned(),
            lists.banned_domains.iter().map(|d| d.to_lowercase()),
        );

        tracing::info!(
            "Crawl policy: {} webring hosts, {} pathsites",
            policy.webring_domains().count(),
            policy.pathsites().len()
        );

        Ok(Self {
            context: Arc::new(CrawlContext {
                client,
                policy,
                extractor,
                scheduler: Mutex::new(scheduler),
            }),
            seeds: webring.iter().map(|link| link.url.clone()).collect(),
            parallelism: config.crawler.parallelism.max(1) as usize,
        })
    }

    /// Runs the crawl until the frontier is drained
    ///
    /// Records are written to `out` as they arrive; the lines of one page are
    /// always contiguous. The writer is handed back with the crawl counters.
    ///
    /// # Errors
    ///
    /// Only failures to write the output are fatal. Fetch failures are logged
    /// and the page is skipped.
    pub async fn run<W: Write>(self, mut out: W) -> Result<(W, CrawlStats), MoldError> {
        let start_time = Instant::now();

        {
            let mut scheduler = self.context.scheduler.lock().await;
            for seed in self.seeds {
                let outcome = scheduler.enqueue(seed.clone(), 1);
                if outcome != EnqueueOutcome::Queued {
                    tracing::debug!("Seed {} not queued: {:?}", seed, outcome);
                }
            }
            tracing::info!(
                "Starting crawl with {} seeds and {} workers",
                scheduler.frontier_size(),
                self.parallelism
            );
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut workers = JoinSet::new();
        for worker_id in 0..self.parallelism {
            let context = Arc::clone(&self.context);
            let tx = tx.clone();
            workers.spawn(async move { worker_loop(worker_id, context, tx).await });
        }
        drop(tx);

        let mut stats = CrawlStats::default();
        while let Some(outcome) = rx.recv().await {
            match outcome {
                PageOutcome::Crawled(records) => {
                    for record in &records {
                        writeln!(out, "{}", record)?;
                    }
                    stats.pages_fetched += 1;
                    stats.records_emitted += records.len();

                    if stats.pages_fetched % PROGRESS_INTERVAL == 0 {
                        let rate = stats.pages_fetched as f64 / start_time.elapsed().as_secs_f64();
                        tracing::info!(
                            "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                            stats.pages_fetched,
                            self.context.scheduler.lock().await.frontier_size(),
                            rate
                        );
                    }
                }
                PageOutcome::Skipped => stats.pages_skipped += 1,
                PageOutcome::Failed => stats.pages_failed += 1,
            }
        }
        out.flush()?;

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker stopped abnormally: {}", e);
            }
        }

        stats.urls_dropped = self.context.scheduler.lock().await.dropped_count();

        tracing::info!(
            "Crawl completed in {:?}: {} pages fetched, {} skipped, {} failed, {} records, \
             {} urls dropped",
            start_time.elapsed(),
            stats.pages_fetched,
            stats.pages_skipped,
            stats.pages_failed,
            stats.records_emitted,
            stats.urls_dropped
        );

        Ok((out, stats))
    }
}

async fn worker_loop(
    worker_id: usize,
    context: Arc<CrawlContext>,
    tx: mpsc::UnboundedSender<PageOutcome>,
) {
    loop {
        let dispatch = context.scheduler.lock().await.next_dispatch(Instant::now());

        match dispatch {
            Dispatch::Finished => break,
            Dispatch::Wait(wait) => tokio::time::sleep(wait).await,
            Dispatch::Fetch(queued) => {
                let work = {
                    let context = Arc::clone(&context);
                    let queued = queued.clone();
                    async move { process_url(&context, &queued).await }
                };
                let outcome = run_isolated(&queued.url, work).await;
                // Only after the page's links are enqueued
                context.scheduler.lock().await.complete(&queued);
                if tx.send(outcome).is_err() {
                    break;
                }
            }
        }
    }
    tracing::debug!("Worker {} finished", worker_id);
}

/// Runs one page's work on its own task
///
/// A panic while processing the page counts as a failed page, so the worker
/// still marks the URL complete.
async fn run_isolated<F>(url: &Url, work: F) -> PageOutcome
where
    F: Future<Output = PageOutcome> + Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Processing {} panicked: {}", url, e);
            PageOutcome::Failed
        }
    }
}

/// Fetches one page, extracts its records and enqueues its links
async fn process_url(context: &CrawlContext, queued: &QueuedUrl) -> PageOutcome {
    tracing::debug!("Processing URL: {}", queued.url);

    let (final_url, body) = match fetch_page(&context.client, &queued.url).await {
        FetchResult::Success {
            final_url, body, ..
        } => (final_url, body),
        FetchResult::RejectedStatus { status_code } => {
            tracing::debug!("Skipping {}: HTTP {}", queued.url, status_code);
            return PageOutcome::Skipped;
        }
        FetchResult::NotHtml { content_type } => {
            tracing::debug!("Skipping {}: content type {}", queued.url, content_type);
            return PageOutcome::Skipped;
        }
        FetchResult::NetworkError { error } => {
            tracing::warn!("Failed to fetch {}: {}", queued.url, error);
            return PageOutcome::Failed;
        }
    };

    let Some(host) = extract_domain(&final_url) else {
        return PageOutcome::Skipped;
    };

    if final_url != queued.url {
        let mut scheduler = context.scheduler.lock().await;
        if !admit_redirect(&context.policy, &mut scheduler, &final_url, &host) {
            tracing::debug!("Dropping redirect {} -> {}", queued.url, final_url);
            return PageOutcome::Skipped;
        }
    }

    let page = context.extractor.extract(&body);
    let (records, links) = page_records(
        &context.policy,
        &final_url,
        &host,
        page.links,
        page.facts,
    );

    let mut scheduler = context.scheduler.lock().await;
    for link in links {
        let outcome = scheduler.enqueue(link, queued.depth + 1);
        tracing::trace!("Enqueue outcome: {:?}", outcome);
    }

    PageOutcome::Crawled(records)
}

/// Decides whether the final URL of a redirect may be crawled
///
/// The target must be on an allowed host, inside its pathsite if the host has
/// one, and not visited before. An admitted target is marked as visited.
fn admit_redirect(
    policy: &CrawlPolicy,
    scheduler: &mut Scheduler,
    target: &Url,
    host: &str,
) -> bool {
    scheduler.is_domain_allowed(host) && policy.admits(target) && scheduler.mark_seen(target)
}

/// Builds a page's records and the links it may enqueue
///
/// Link records come first, followed by the page facts.
fn page_records(
    policy: &CrawlPolicy,
    page_url: &Url,
    host: &str,
    hrefs: Vec<String>,
    facts: Vec<(RecordKind, String)>,
) -> (Vec<CrawlRecord>, Vec<Url>) {
    let depth = policy.depth_for(host);
    let mut records = Vec::new();
    let mut links = Vec::new();

    for href in hrefs {
        let Some(link) = policy.screen_href(&href, page_url) else {
            continue;
        };

        if let Some(kind) = policy.classify_link(&link, host) {
            records.push(CrawlRecord::new(
                kind,
                link.as_str(),
                page_url.as_str(),
                depth,
            ));
        }

        if policy.admits(&link) {
            links.push(link);
        }
    }

    records.extend(
        facts
            .into_iter()
            .map(|(kind, text)| CrawlRecord::new(kind, text, page_url.as_str(), depth)),
    );

    (records, links)
}

/// Runs the crawl engine for a configuration
///
/// This function:
/// 1. Loads the webring member list and the crawl policy lists
/// 2. Builds the coordinator
/// 3. Crawls until the frontier is drained, writing records to `out`
///
/// # Example
///
/// ```no_run
/// use moldweb::config::load_config;
/// use moldweb::crawler::{build_http_client, run_crawl};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let client = build_http_client(&config)?;
/// run_crawl(&config, client, std::io::stdout()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl<W: Write>(
    config: &Config,
    client: Client,
    out: W,
) -> Result<(W, CrawlStats), MoldError> {
    let webring = load_webring(&config.crawler.webring)?;
    let lists = PolicyLists::load(config, ListKind::CRAWL)?;
    tracing::info!("Loaded {} webring members", webring.len());

    let coordinator = Coordinator::new(config, client, &webring, &lists)?;
    coordinator.run(out).await
}
