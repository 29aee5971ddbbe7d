//! One-shot run strategy
//!
//! Processes every `*.csv` file present in the input directory, in filename
//! order, on the calling thread, then returns.

use crate::core::FileProcessor;
use crate::strategy::{discover_existing, IngestStrategy, RunSummary};
use crate::types::Result;
use log::info;

/// Process the files that exist now and stop
#[derive(Debug, Clone, Copy)]
pub struct OnceStrategy;

impl IngestStrategy for OnceStrategy {
    fn run(&self, processor: &FileProcessor) -> Result<RunSummary> {
        let input_dir = &processor.directories().input;
        let filenames = discover_existing(input_dir)?;
        info!(
            "Found {} CSV file(s) in {}",
            filenames.len(),
            input_dir.display()
        );

        let mut summary = RunSummary::default();
        for filename in filenames {
            let result = processor.handle_file(&filename);
            summary.record(&filename, result);
        }

        Ok(summary)
    }
}
