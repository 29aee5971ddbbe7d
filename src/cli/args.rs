use crate::core::file_processor::same_directory;
use crate::core::Directories;
use crate::strategy::WatchConfig;
use crate::types::{IngestError, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

/// Watch a directory for CSV files and convert them to JSON
#[derive(Parser, Debug)]
#[command(name = "csv-ingest")]
#[command(about = "Watch a directory for CSV files and convert them to JSON", long_about = None)]
pub struct CliArgs {
    /// Directory to pick up CSV files from
    #[arg(
        long = "input",
        value_name = "DIR",
        help = "Directory to pick up *.csv files from (processed files are deleted)"
    )]
    pub input: PathBuf,

    /// Directory receiving the JSON output
    #[arg(
        long = "output",
        value_name = "DIR",
        default_value = ".",
        help = "Directory receiving <name>.json for each processed file"
    )]
    pub output: PathBuf,

    /// Directory receiving the error reports
    #[arg(
        long = "errors",
        value_name = "DIR",
        default_value = ".",
        help = "Directory receiving <name>.csv error reports"
    )]
    pub errors: PathBuf,

    /// Remove previous outputs before running
    #[arg(
        long = "clean",
        help = "Remove *.json and *.csv files from the output and error directories before running"
    )]
    pub clean: bool,

    /// Run mode
    #[arg(
        long = "mode",
        value_name = "MODE",
        default_value = "watch",
        help = "Run mode: 'watch' to keep watching for new files or 'once' to process existing files and exit"
    )]
    pub mode: RunMode,

    /// Settle interval for new files (watch mode only)
    #[arg(
        long = "settle-ms",
        value_name = "MS",
        help = "Milliseconds between size checks on a new file before processing it (default: 100)"
    )]
    pub settle_ms: Option<u64>,
}

/// Available run modes
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    Watch,
    Once,
}

/// Validated settings for one run of the service
#[derive(Clone, Debug)]
pub struct Config {
    pub directories: Directories,
    pub mode: RunMode,
    pub clean: bool,
    pub watch: WatchConfig,
}

impl CliArgs {
    /// Create a WatchConfig from CLI arguments
    ///
    /// Falls back to the default settle interval when none was given.
    pub fn to_watch_config(&self) -> WatchConfig {
        match self.settle_ms {
            Some(settle_ms) => WatchConfig::new(settle_ms),
            None => WatchConfig::default(),
        }
    }

    /// Validate the arguments into a run configuration
    ///
    /// The input directory must exist. Output and error directories are
    /// created when missing. The error directory must differ from the input
    /// directory, since error reports share the `.csv` extension with inputs.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::InvalidDirectory` for an unusable directory.
    pub fn to_config(&self) -> Result<Config> {
        if !self.input.is_dir() {
            return Err(IngestError::invalid_directory(
                &self.input,
                "input directory does not exist or is not a directory",
            ));
        }
        if same_directory(&self.input, &self.errors) {
            return Err(IngestError::invalid_directory(
                &self.errors,
                "error directory must differ from the input directory",
            ));
        }

        ensure_dir(&self.output)?;
        ensure_dir(&self.errors)?;

        Ok(Config {
            directories: Directories::new(&self.input, &self.output, &self.errors),
            mode: self.mode,
            clean: self.clean,
            watch: self.to_watch_config(),
        })
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(IngestError::invalid_directory(path, "not a directory"));
    }
    fs::create_dir_all(path)
        .map_err(|e| IngestError::invalid_directory(path, &format!("cannot be created: {}", e)))
}
