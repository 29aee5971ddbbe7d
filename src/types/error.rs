//! Error types for the CSV ingest service
//!
//! This module defines every error that aborts the processing of a file or the
//! service itself. Row-level validation problems are not errors in this sense:
//! they are collected as [`RowError`](super::RowError) values and written to the
//! error report instead.
//!
//! # Error Categories
//!
//! - **Malformed input**: CSV text that cannot be parsed at all
//! - **Structural rows**: rows that do not have exactly five cells
//! - **I/O errors**: missing input files, failed writes, failed removals
//! - **Configuration errors**: input/output directories that cannot be used
//! - **Watcher errors**: the filesystem event source failed

use thiserror::Error;

/// Main error type for the ingest service
///
/// Each variant carries enough context to be logged on its own, since the
/// caller of the file processor logs the error and moves on to the next file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    /// CSV text is not well-formed (unbalanced quotes, uneven row widths, bad UTF-8)
    ///
    /// Aborts the whole file. Nothing is written and the source stays in place.
    #[error("Malformed CSV input{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    MalformedInput {
        /// Line number where the problem was detected (if available)
        line: Option<u64>,
        /// Description of the problem
        message: String,
    },

    /// A row does not have the fixed number of cells
    ///
    /// Same severity as [`IngestError::MalformedInput`].
    #[error("Row at line {line} has {found} cells, expected {expected}")]
    StructuralRow {
        /// 1-based line number of the row (header is line 1)
        line: usize,
        /// Number of cells the schema requires
        expected: usize,
        /// Number of cells found
        found: usize,
    },

    /// Reading, writing or removing a file failed
    #[error("I/O error on {path}: {message}")]
    Io {
        /// Path of the file or directory involved
        path: String,
        /// Description of the I/O error
        message: String,
    },

    /// Encoding the JSON or CSV output failed
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the encoding failure
        message: String,
    },

    /// A configured directory cannot be used
    #[error("Invalid directory {path}: {message}")]
    InvalidDirectory {
        /// The offending directory path
        path: String,
        /// Why it was rejected
        message: String,
    },

    /// The filesystem watcher or its runtime failed
    ///
    /// Fatal for watch mode.
    #[error("Watcher error: {message}")]
    Watcher {
        /// Description of the watcher failure
        message: String,
    },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, IngestError>;

// Conversion from csv::Error to IngestError
impl From<csv::Error> for IngestError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        IngestError::MalformedInput {
            line,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(error: serde_json::Error) -> Self {
        IngestError::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<notify::Error> for IngestError {
    fn from(error: notify::Error) -> Self {
        IngestError::Watcher {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl IngestError {
    /// Create an Io error for the given path
    pub fn io(path: impl AsRef<std::path::Path>, error: &std::io::Error) -> Self {
        IngestError::Io {
            path: path.as_ref().display().to_string(),
            message: error.to_string(),
        }
    }

    /// Create a MalformedInput error
    pub fn malformed(line: Option<u64>, message: &str) -> Self {
        IngestError::MalformedInput {
            line,
            message: message.to_string(),
        }
    }

    /// Create a StructuralRow error
    pub fn structural_row(line: usize, expected: usize, found: usize) -> Self {
        IngestError::StructuralRow {
            line,
            expected,
            found,
        }
    }

    /// Create an InvalidDirectory error
    pub fn invalid_directory(path: impl AsRef<std::path::Path>, message: &str) -> Self {
        IngestError::InvalidDirectory {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a Watcher error
    pub fn watcher(message: impl Into<String>) -> Self {
        IngestError::Watcher {
            message: message.into(),
        }
    }
}
