//! Run strategy module for feeding files to the processor
//!
//! This module defines the Strategy pattern for how files reach the
//! [`FileProcessor`]: a one-shot scan of the input directory, or a scan
//! followed by watching the directory for new files. Both funnel every
//! filename through the same processor, one file at a time.

use crate::cli::RunMode;
use crate::core::{FileProcessor, Outcome};
use crate::types::{IngestError, Result};
use log::error;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

pub mod once;
pub mod watch;

pub use once::OnceStrategy;
pub use watch::{WatchConfig, WatchStrategy};

static CANDIDATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+\.csv$").expect("candidate pattern is a valid regex"));

/// Run strategy trait for delivering filenames to the processor
pub trait IngestStrategy: Send + Sync {
    /// Deliver files from the input directory to the processor
    ///
    /// Failures of individual files are logged and counted in the summary;
    /// they never stop the run.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures of the run itself: the input
    /// directory cannot be listed, or the watcher fails.
    fn run(&self, processor: &FileProcessor) -> Result<RunSummary>;
}

/// Counts of what happened to the files seen during a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Count the result of one `handle_file` call, logging failures
    pub fn record(&mut self, filename: &str, result: Result<Outcome>) {
        match result {
            Ok(Outcome::Processed(_)) => self.processed += 1,
            Ok(Outcome::Skipped) => self.skipped += 1,
            Err(e) => {
                error!("Failed to process {}: {}", filename, e);
                self.failed += 1;
            }
        }
    }
}

/// Whether a filename is one the service should pick up (`*.csv`)
pub fn is_candidate(filename: &str) -> bool {
    CANDIDATE_PATTERN.is_match(filename)
}

/// List candidate files already present in a directory
///
/// Only regular files matching `*.csv` are returned, sorted by name.
///
/// # Errors
///
/// Returns `IngestError::Io` if the directory cannot be read.
pub fn discover_existing(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| IngestError::io(dir, &e))?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_candidate(name))
        .collect();
    names.sort();

    Ok(names)
}

/// Create a run strategy for the given mode
///
/// # Arguments
///
/// * `mode` - Whether to process existing files once or keep watching
/// * `config` - Watch settings (ignored for once mode)
pub fn create_strategy(mode: RunMode, config: Option<WatchConfig>) -> Box<dyn IngestStrategy> {
    match mode {
        RunMode::Once => Box::new(OnceStrategy),
        RunMode::Watch => Box::new(WatchStrategy::new(config.unwrap_or_default())),
    }
}
