//! Scheduler for managing the crawl frontier and rate limiting
//!
//! This module handles:
//! - FIFO frontier management with a hard capacity ceiling
//! - Revisit suppression keyed by exact URL
//! - Allowed/banned host enforcement and the traversal depth bound
//! - Per-host minimum delays and parallelism

use crate::config::CrawlerConfig;
use crate::state::DomainState;
use crate::url::extract_domain;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};
use url::Url;

/// Wait used while other workers may still discover URLs
const IDLE_WAIT: Duration = Duration::from_millis(50);

/// Numeric crawl limits derived from the crawler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Deepest traversal depth fetched; 0 disables the bound
    pub max_depth: u32,
    pub queue_capacity: usize,
    pub domain_delay: Duration,
    pub domain_parallelism: u32,
}

impl From<&CrawlerConfig> for CrawlLimits {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            queue_capacity: config.queue_capacity,
            domain_delay: Duration::from_millis(config.delay_ms),
            domain_parallelism: config.domain_parallelism,
        }
    }
}

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// The host of this URL
    pub domain: String,

    /// Traversal depth; seeds are depth 1
    pub depth: u32,
}

/// Why a URL was or was not added to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    AlreadySeen,
    DomainNotAllowed,
    DomainBanned,
    TooDeep,
    QueueFull,
    Unusable,
}

/// What a worker should do next
#[derive(Debug)]
pub enum Dispatch {
    /// Fetch this URL, then report back with [`Scheduler::complete`]
    Fetch(QueuedUrl),
    /// Nothing is ready yet; check again after this long
    Wait(Duration),
    /// The frontier is drained and nothing is in flight
    Finished,
}

/// Scheduler manages the frontier queue and politeness
///
/// The scheduler coordinates:
/// - Which hosts may be crawled at all
/// - Which URLs have already been handed out
/// - Per-host rate limits (minimum time between requests)
/// - Per-host parallelism
pub struct Scheduler {
    limits: CrawlLimits,

    /// Hosts allowed to be fetched; empty allows every host
    allowed_domains: HashSet<String>,

    /// Hosts never fetched
    banned_domains: HashSet<String>,

    /// Pending URLs in discovery order
    frontier: VecDeque<QueuedUrl>,

    /// Every URL ever queued or fetched
    seen: HashSet<String>,

    domain_states: HashMap<String, DomainState>,

    in_flight: usize,

    dropped: usize,
}

impl Scheduler {
    /// Creates a new scheduler with an empty frontier
    pub fn new<A, B>(limits: CrawlLimits, allowed_domains: A, banned_domains: B) -> Self
    where
        A: IntoIterator<Item = String>,
        B: IntoIterator<Item = String>,
    {
        Self {
            limits,
            allowed_domains: allowed_domains.into_iter().collect(),
            banned_domains: banned_domains.into_iter().collect(),
            frontier: VecDeque::new(),
            seen: HashSet::new(),
            domain_states: HashMap::new(),
            in_flight: 0,
            dropped: 0,
        }
    }

    /// Offers a URL to the frontier
    ///
    /// The URL is queued only if its host is allowed and not banned, its depth
    /// is within bounds, it has never been queued before, and the frontier has
    /// room.
    pub fn enqueue(&mut self, url: Url, depth: u32) -> EnqueueOutcome {
        if self.limits.max_depth > 0 && depth > self.limits.max_depth {
            return EnqueueOutcome::TooDeep;
        }

        let domain = match extract_domain(&url) {
            Some(d) if matches!(url.scheme(), "http" | "https") => d,
            _ => return EnqueueOutcome::Unusable,
        };

        if !self.is_domain_allowed(&domain) {
            return if self.banned_domains.contains(&domain) {
                EnqueueOutcome::DomainBanned
            } else {
                EnqueueOutcome::DomainNotAllowed
            };
        }

        if self.seen.contains(url.as_str()) {
            return EnqueueOutcome::AlreadySeen;
        }

        if self.frontier.len() >= self.limits.queue_capacity {
            self.dropped += 1;
            tracing::debug!("Frontier full, dropping {}", url);
            return EnqueueOutcome::QueueFull;
        }

        self.seen.insert(url.as_str().to_string());
        self.frontier.push_back(QueuedUrl { url, domain, depth });
        EnqueueOutcome::Queued
    }

    /// Checks a host against the allow and deny lists
    pub fn is_domain_allowed(&self, domain: &str) -> bool {
        if self.banned_domains.contains(domain) {
            return false;
        }
        self.allowed_domains.is_empty() || self.allowed_domains.contains(domain)
    }

    /// Marks a URL as visited without queueing it
    ///
    /// Returns false if it had already been seen. Used for redirect targets so
    /// the final URL of a redirect is not fetched again.
    pub fn mark_seen(&mut self, url: &Url) -> bool {
        self.seen.insert(url.as_str().to_string())
    }

    /// Picks the next URL whose host is ready for a request
    ///
    /// URLs are considered in FIFO order; URLs on hosts that are still cooling
    /// down keep their place in the queue.
    pub fn next_dispatch(&mut self, now: Instant) -> Dispatch {
        if self.is_finished() {
            return Dispatch::Finished;
        }
        if self.frontier.is_empty() {
            return Dispatch::Wait(IDLE_WAIT);
        }

        let limits = &self.limits;
        let states = &self.domain_states;
        let ready = self.frontier.iter().position(|queued| {
            states
                .get(&queued.domain)
                .map_or(true, |state| state.can_request(limits, now))
        });

        match ready.and_then(|index| self.frontier.remove(index)) {
            Some(queued) => {
                self.domain_states
                    .entry(queued.domain.clone())
                    .or_default()
                    .record_request(now);
                self.in_flight += 1;
                tracing::trace!("Dispatching {} (depth {})", queued.url, queued.depth);
                Dispatch::Fetch(queued)
            }
            None => Dispatch::Wait(self.calculate_minimum_wait_time(now)),
        }
    }

    /// Records that a dispatched fetch has finished
    pub fn complete(&mut self, queued: &QueuedUrl) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if let Some(state) = self.domain_states.get_mut(&queued.domain) {
            state.record_complete();
        }
    }

    /// Calculates the minimum time to wait before any queued host is ready
    fn calculate_minimum_wait_time(&self, now: Instant) -> Duration {
        let mut min_wait = self.limits.domain_delay.max(Duration::from_millis(10));

        for queued in self.frontier.iter() {
            if let Some(state) = self.domain_states.get(&queued.domain) {
                if let Some(wait) = state.time_until_next_request(&self.limits, now) {
                    min_wait = min_wait.min(wait);
                }
            }
        }

        // Small buffer so the host is definitely ready
        min_wait + Duration::from_millis(10)
    }

    /// Returns the number of URLs in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns the number of fetches currently dispatched
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Returns how many URLs were dropped because the frontier was full
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    /// Returns whether the crawl is drained
    pub fn is_finished(&self) -> bool {
        self.frontier.is_empty() && self.in_flight == 0
    }

    /// Gets the politeness state for a host
    pub fn get_domain_state(&self, domain: &str) -> Option<&DomainState> {
        self.domain_states.get(domain)
    }
}
