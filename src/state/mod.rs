//! State module for tracking crawl progress
//!
//! - `DomainState`: per-host request timing and in-flight counts used by the
//!   scheduler for politeness

mod domain_state;

pub use domain_state::DomainState;
