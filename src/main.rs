//! MoldWeb main entry point
//!
//! This is the command-line interface for the MoldWeb crawl-and-index core.

use anyhow::Context;
use clap::{Parser, Subcommand};
use moldweb::config::{load_config_with_hash, Config, ListKind, PolicyLists};
use moldweb::crawler::{build_http_client, run_crawl};
use moldweb::ingest::run_ingest;
use moldweb::precrawl::run_precrawl;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// MoldWeb: a webring crawler and indexer
///
/// MoldWeb discovers webring members from a federated link graph, crawls
/// their pages under domain and path policies, and builds a SQLite word index
/// from the crawl output.
#[derive(Parser, Debug)]
#[command(name = "moldweb")]
#[command(version)]
#[command(about = "A webring crawler and indexer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk the link graph and print webring members as `url | depth`
    Precrawl {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Crawl the webring and print one record per extracted fact
    Crawl {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a fresh index from crawl records
    Ingest {
        /// Record file to read, `-` for stdin (defaults to data.source)
        #[arg(short, long)]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Precrawl { output } => handle_precrawl(&config, output.as_deref()).await,
        Command::Crawl { output } => handle_crawl(&config, output.as_deref()).await,
        Command::Ingest { source } => handle_ingest(&config, source.as_deref()),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries the record stream.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("moldweb=info,warn"),
            1 => EnvFilter::new("moldweb=debug,info"),
            2 => EnvFilter::new("moldweb=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write + Send>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(std::io::stdout())),
    })
}

/// Handles the precrawl command: walks the link graph
async fn handle_precrawl(config: &Config, output: Option<&Path>) -> anyhow::Result<()> {
    let lists = PolicyLists::load(config, &[ListKind::BannedDomains])?;
    let client = build_http_client(config)?;
    let out = open_output(output)?;

    let (_, stats) = run_precrawl(&client, &config.general.url, &lists.banned_domains, out)
        .await
        .context("Precrawl failed")?;
    tracing::info!("Precrawl found {} webring members", stats.spores_emitted);
    Ok(())
}

/// Handles the crawl command: crawls the webring members
async fn handle_crawl(config: &Config, output: Option<&Path>) -> anyhow::Result<()> {
    tracing::info!("Starting crawl of {}", config.general.name);
    let client = build_http_client(config)?;
    let out = open_output(output)?;

    let (_, stats) = run_crawl(config, client, out).await.context("Crawl failed")?;
    tracing::info!("Crawl emitted {} records", stats.records_emitted);
    Ok(())
}

/// Handles the ingest command: rebuilds the index
fn handle_ingest(config: &Config, source: Option<&str>) -> anyhow::Result<()> {
    let stats = run_ingest(config, source).context("Ingest failed")?;
    tracing::info!(
        "Ingest completed: {} lines, {} words",
        stats.lines_read,
        stats.words_indexed
    );
    Ok(())
}
