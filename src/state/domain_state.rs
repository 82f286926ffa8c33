use crate::crawler::CrawlLimits;
use std::time::{Duration, Instant};

/// Tracks the politeness state of one host during crawling
///
/// The scheduler keeps one of these per host to enforce the minimum delay
/// between requests and the per-host parallelism bound.
#[derive(Debug, Clone, Default)]
pub struct DomainState {
    /// Number of requests made to this host in the current crawl
    pub request_count: u32,

    /// Fetches currently running against this host
    pub in_flight: u32,

    /// Timestamp of the last request to this host
    pub last_request_time: Option<Instant>,
}

impl DomainState {
    /// Creates a new DomainState with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a request can be made to this host
    ///
    /// This method enforces:
    /// - The per-host parallelism bound
    /// - Minimum time between requests to the same host
    pub fn can_request(&self, limits: &CrawlLimits, now: Instant) -> bool {
        if self.in_flight >= limits.domain_parallelism {
            return false;
        }
        self.time_until_next_request(limits, now).is_none()
    }

    /// Records that a request was started against this host
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.in_flight += 1;
        self.last_request_time = Some(now);
    }

    /// Records that a request against this host finished
    pub fn record_complete(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Calculates the time until the delay since the last request has passed
    ///
    /// Returns None if the delay has already passed.
    pub fn time_until_next_request(&self, limits: &CrawlLimits, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < limits.domain_delay {
            Some(limits.domain_delay - elapsed)
        } else {
            None
        }
    }
}
