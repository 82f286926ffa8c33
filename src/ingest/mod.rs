//! Ingestion of the crawl record stream into the search index
//!
//! Each record line updates one page aggregate and contributes scored words.
//! Pages, words and external links are buffered and written in batches.

mod batch;
mod page;
mod tokenizer;

pub use batch::{BatchCommitter, SearchFragment, PAGE_BATCH_THRESHOLD, WORD_CHUNK_SIZE};
pub use page::{passes_about_heuristic, score_for, PageData};
pub use tokenizer::{path_segments, Tokenizer};

use crate::config::{Config, ListKind, PolicyLists};
use crate::record::{CrawlRecord, RecordError, RecordKind};
use crate::storage::{IndexStore, SqliteIndexStore};
use crate::MoldError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Lines between progress log lines
const PROGRESS_INTERVAL: usize = 100_000;

/// Score of words taken from a page URL's path
const PATH_SEGMENT_SCORE: u32 = 2;

/// Source name that reads the record stream from stdin
pub const STDIN_SOURCE: &str = "-";

/// Counters reported at the end of an ingest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub lines_read: usize,
    pub lines_skipped: usize,
    pub records_ignored: usize,
    pub words_indexed: usize,
    pub flushes: usize,
    pub failed_flushes: usize,
}

/// Turns record lines into page aggregates and index words
pub struct Ingestor<S: IndexStore> {
    tokenizer: Tokenizer,
    heuristics: Vec<String>,
    committer: BatchCommitter<S>,
    stats: IngestStats,
}

impl<S: IndexStore> Ingestor<S> {
    pub fn new(store: S, lists: &PolicyLists) -> Result<Self, MoldError> {
        Ok(Self {
            tokenizer: Tokenizer::new(&lists.stopwords)?,
            heuristics: lists.about_heuristics.clone(),
            committer: BatchCommitter::new(store),
            stats: IngestStats::default(),
        })
    }

    /// Processes one record line
    ///
    /// Malformed lines and lines with unknown tokens are logged and skipped.
    pub fn ingest_line(&mut self, line: &str) {
        self.stats.lines_read += 1;

        let record = match CrawlRecord::parse_line(line) {
            Ok(record) => record,
            Err(RecordError::TooFewFields(_)) => {
                tracing::warn!("Skipping malformed line: {}", line);
                self.stats.lines_skipped += 1;
                return;
            }
            Err(e) => {
                tracing::debug!("Skipping line: {}", e);
                self.stats.lines_skipped += 1;
                return;
            }
        };

        self.apply_record(record);

        if self.committer.should_flush() {
            self.flush();
        }
    }

    fn apply_record(&mut self, record: CrawlRecord) {
        let CrawlRecord {
            kind,
            payload,
            url,
            depth,
        } = record;

        if matches!(kind, RecordKind::ParaJustP | RecordKind::WebringLink) {
            self.stats.records_ignored += 1;
            return;
        }

        let page = self.committer.page_mut(&url, depth);
        page.apply(kind, &payload, &self.heuristics);
        let index_path = kind == RecordKind::Title && !page.path_indexed;
        page.path_indexed |= index_path;

        let words = match kind {
            RecordKind::Lang => Vec::new(),
            RecordKind::NonWebringLink => {
                self.committer.add_external_link(payload);
                Vec::new()
            }
            RecordKind::Keywords => self.tokenizer.keywords(&payload),
            _ => self.tokenizer.tokenize(&payload),
        };

        let score = score_for(kind);
        self.stats.words_indexed += words.len();
        self.committer.add_fragments(
            words
                .into_iter()
                .map(|word| SearchFragment::new(word, url.as_str(), score)),
        );

        if index_path {
            self.committer.add_fragments(
                path_segments(&url)
                    .into_iter()
                    .map(|word| SearchFragment::new(word, url.as_str(), PATH_SEGMENT_SCORE)),
            );
        }
    }

    /// Reads record lines until end of input
    ///
    /// Invalid UTF-8 is replaced rather than treated as an error.
    pub fn ingest_reader<R: BufRead>(&mut self, reader: R) -> Result<(), MoldError> {
        for line in reader.split(b'\n') {
            let line = line?;
            let line = String::from_utf8_lossy(&line);
            self.ingest_line(line.strip_suffix('\r').unwrap_or(&line));

            if self.stats.lines_read % PROGRESS_INTERVAL == 0 {
                tracing::info!("Processed {} lines", self.stats.lines_read);
            }
        }
        Ok(())
    }

    fn flush(&mut self) {
        if let Err(e) = self.committer.flush() {
            tracing::error!("Batch {} failed: {}", self.committer.flush_count(), e);
            self.stats.failed_flushes += 1;
        }
        self.stats.flushes = self.committer.flush_count();
    }

    /// Runs the final flush and hands back the store
    pub fn finish(mut self) -> (S, IngestStats) {
        self.flush();
        (self.committer.into_store(), self.stats)
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }
}

/// Builds a fresh index from a record stream
///
/// This function:
/// 1. Deletes any existing database and initializes a new one
/// 2. Records today's date as the crawl date
/// 3. Streams `source` (a file path, or `-` for stdin) through an [`Ingestor`]
/// 4. Flushes the remaining buffers
///
/// `source` defaults to `data.source` from the configuration.
pub fn run_ingest(config: &Config, source: Option<&str>) -> Result<IngestStats, MoldError> {
    let lists = PolicyLists::load(config, ListKind::INGEST)?;
    let mut store = SqliteIndexStore::create_fresh(Path::new(&config.data.database))?;

    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    store.update_crawl_date(&date)?;

    let source = source.unwrap_or(&config.data.source);
    tracing::info!("Ingesting {} into {}", source, config.data.database);

    let mut ingestor = Ingestor::new(store, &lists)?;
    if source == STDIN_SOURCE {
        ingestor.ingest_reader(std::io::stdin().lock())?;
    } else {
        let file = File::open(source)?;
        ingestor.ingest_reader(BufReader::new(file))?;
    }

    let (store, stats) = ingestor.finish();
    tracing::info!(
        "Ingested {} words from {} lines ({} skipped) in {} batches ({} failed); \
         index holds {} pages",
        stats.words_indexed,
        stats.lines_read,
        stats.lines_skipped,
        stats.flushes,
        stats.failed_flushes,
        store.count_pages()?
    );

    Ok(stats)
}
