//! URL handling module for MoldWeb
//!
//! This module provides link canonicalization, domain extraction and
//! normalization, and matching of links against the policy lists.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, hostname_of, normalize_domain};
pub use matcher::{contains_any, has_banned_suffix, is_disallowed_phrase};
pub use normalize::{canonical_page_url, get_link, resolve_link};
