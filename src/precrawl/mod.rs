//! Link graph walker ("precrawl")
//!
//! Walks a federated graph of JSON documents breadth-first, starting at the
//! ring's bootstrap URL. Each document lists `spores` (candidate sites) and
//! `hyphae` (further graph documents). Every newly discovered spore is written
//! as a `<url> | <depth>` line, where depth is the graph level it was found at.

use crate::url::{get_link, normalize_domain};
use crate::MoldError;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::io::Write;
use url::Url;

/// One node of the link graph
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Mushroom {
    #[serde(deserialize_with = "null_as_empty")]
    pub spores: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub hyphae: Vec<String>,
    pub id: String,
    pub location: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counters reported at the end of a walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecrawlStats {
    pub nodes_fetched: usize,
    pub nodes_failed: usize,
    pub spores_emitted: usize,
    pub max_depth: u32,
}

/// Deduplication state of a walk
#[derive(Debug, Default)]
pub struct LinkGraphWalker {
    banned: HashSet<String>,
    emitted: HashSet<String>,
    seen_domains: HashSet<String>,
    explored: HashSet<String>,
}

impl LinkGraphWalker {
    pub fn new(banned_domains: &[String]) -> Self {
        Self {
            banned: banned_domains.iter().map(|d| d.to_lowercase()).collect(),
            ..Self::default()
        }
    }

    /// Returns the spores of a node that have not been emitted before
    ///
    /// A spore is admitted when it parses as an absolute URL with a host, the
    /// host is not banned, the link was not emitted before, and its
    /// `www.`-stripped host has not been seen before.
    pub fn admit_spores(&mut self, spores: &[String]) -> Vec<String> {
        let mut admitted = Vec::new();
        for spore in spores {
            let link = get_link(spore);
            let Some(host) = Url::parse(&link)
                .ok()
                .and_then(|u| u.host_str().map(str::to_lowercase))
            else {
                tracing::debug!("Skipping unparseable spore: {}", spore);
                continue;
            };

            let domain = normalize_domain(&host).to_string();
            if self.banned.contains(&host)
                || self.emitted.contains(&link)
                || self.seen_domains.contains(&domain)
            {
                continue;
            }

            self.seen_domains.insert(domain);
            self.emitted.insert(link.clone());
            admitted.push(link);
        }
        admitted
    }

    /// Appends the node's unexplored hyphae to the next level
    pub fn collect_hyphae(&self, hyphae: &[String], next_level: &mut Vec<String>) {
        for hypha in hyphae {
            let link = get_link(hypha);
            if !self.explored.contains(&link) && !next_level.contains(&link) {
                next_level.push(link);
            }
        }
    }

    /// Marks a graph document as explored; returns false if it already was
    pub fn mark_explored(&mut self, link: &str) -> bool {
        self.explored.insert(link.to_string())
    }
}

/// Fetches and decodes one graph document
///
/// # Errors
///
/// * `MoldError::Http` - the request failed
/// * `MoldError::BadStatus` - the response status was not a success
/// * `MoldError::Decode` - the body is not a valid node
pub async fn fetch_node(client: &Client, link: &str) -> Result<Mushroom, MoldError> {
    let body = fetch_body(client, link, |status| status.is_success()).await?;
    decode_node(link, &body)
}

async fn fetch_body(
    client: &Client,
    link: &str,
    accept: impl Fn(StatusCode) -> bool,
) -> Result<String, MoldError> {
    let http_error = |source| MoldError::Http {
        url: link.to_string(),
        source,
    };

    let response = client.get(link).send().await.map_err(http_error)?;
    let status = response.status();
    if !accept(status) {
        return Err(MoldError::BadStatus {
            url: link.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(http_error)
}

fn decode_node(link: &str, body: &str) -> Result<Mushroom, MoldError> {
    serde_json::from_str(body).map_err(|source| MoldError::Decode {
        url: link.to_string(),
        source,
    })
}

/// Runs the link graph walk from `bootstrap_url`, writing `url | depth` lines
///
/// # Errors
///
/// A failed bootstrap request or a bootstrap status other than 200 is fatal,
/// as is a failure to write the output. A bootstrap document that does not
/// decode is logged and ends the walk. Failures on later documents are logged
/// and the document is skipped.
pub async fn run_precrawl<W: Write>(
    client: &Client,
    bootstrap_url: &str,
    banned_domains: &[String],
    mut out: W,
) -> Result<(W, PrecrawlStats), MoldError> {
    let mut stats = PrecrawlStats::default();
    let mut walker = LinkGraphWalker::new(banned_domains);

    tracing::info!("Starting precrawl from {}", bootstrap_url);
    let body = fetch_body(client, bootstrap_url, |status| status == StatusCode::OK).await?;
    walker.mark_explored(&get_link(bootstrap_url));

    let root = match decode_node(bootstrap_url, &body) {
        Ok(node) => node,
        Err(e) => {
            tracing::error!("{}", e);
            stats.nodes_failed += 1;
            return Ok((out, stats));
        }
    };
    stats.nodes_fetched += 1;

    let mut depth = 1;
    let spores = walker.admit_spores(&root.spores);
    write_spores(&mut out, &mut stats, spores, depth)?;

    let mut current_level = Vec::new();
    walker.collect_hyphae(&root.hyphae, &mut current_level);

    while !current_level.is_empty() {
        depth += 1;
        let mut next_level = Vec::new();
        tracing::debug!(
            "Exploring {} documents at depth {}",
            current_level.len(),
            depth
        );

        for link in current_level {
            if !walker.mark_explored(&link) {
                continue;
            }

            let node = match fetch_node(client, &link).await {
                Ok(node) => node,
                Err(e) => {
                    tracing::warn!("Skipping graph document: {}", e);
                    stats.nodes_failed += 1;
                    continue;
                }
            };
            stats.nodes_fetched += 1;

            let spores = walker.admit_spores(&node.spores);
            write_spores(&mut out, &mut stats, spores, depth)?;
            walker.collect_hyphae(&node.hyphae, &mut next_level);
        }

        current_level = next_level;
    }

    out.flush()?;
    tracing::info!(
        "Precrawl completed: {} spores from {} documents ({} failed), deepest level {}",
        stats.spores_emitted,
        stats.nodes_fetched,
        stats.nodes_failed,
        stats.max_depth
    );

    Ok((out, stats))
}

fn write_spores<W: Write>(
    out: &mut W,
    stats: &mut PrecrawlStats,
    spores: Vec<String>,
    depth: u32,
) -> std::io::Result<()> {
    for link in &spores {
        writeln!(out, "{} | {}", link, depth)?;
    }
    if !spores.is_empty() {
        stats.spores_emitted += spores.len();
        stats.max_depth = stats.max_depth.max(depth);
    }
    Ok(())
}
