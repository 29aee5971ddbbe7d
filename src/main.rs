//! CSV Ingest CLI
//!
//! Watches an input directory for CSV files, converts each file to JSON and
//! writes an error report for rows that fail validation.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --input ./incoming --output ./json --errors ./errors
//! cargo run -- --input ./incoming --output ./json --errors ./errors --clean
//! cargo run -- --input ./incoming --output ./json --errors ./errors --mode once
//! ```
//!
//! # Run Modes
//!
//! - **watch**: Process existing files, then keep watching for new ones until Ctrl-C (default)
//! - **once**: Process existing files and exit
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Logging verbosity (default `info`)
//!
//! # Exit Codes
//!
//! - 0: Success (individual files may still have failed; see the log)
//! - 1: Fatal error (invalid directories, watcher failure)

use csv_ingest::cli::{self, CliArgs};
use csv_ingest::core::{FileProcessor, ProcessedSet};
use csv_ingest::strategy;
use csv_ingest::types::Result;
use log::info;
use std::process;
use std::sync::Arc;

fn main() {
    cli::init_logging();

    let args = cli::parse_args();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let config = args.to_config()?;

    let processor = FileProcessor::new(config.directories, Arc::new(ProcessedSet::new()));

    if config.clean {
        let removed = processor.clean()?;
        info!("Removed {} previous output file(s)", removed);
    }

    let strategy = strategy::create_strategy(config.mode, Some(config.watch));
    let summary = strategy.run(&processor)?;

    info!(
        "Finished: {} processed, {} skipped, {} failed",
        summary.processed, summary.skipped, summary.failed
    );

    Ok(())
}
