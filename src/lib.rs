//! CSV Ingest Library
//! # Overview
//!
//! This library watches a directory for CSV files of people, converts every row
//! into a structured record, and writes two documents per file: a JSON array of
//! all records and a CSV report of the rows that failed validation. The source
//! file is removed once both are written.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Record, RowError, IngestError)
//! - [`cli`] - CLI arguments parsing and configuration
//! - [`core`] - Business logic components:
//!   - [`core::validators`] - Per-field validation rules
//!   - [`core::record_builder`] - Record construction with error collection
//!   - [`core::pipeline`] - CSV text to JSON and error report
//!   - [`core::file_processor`] - File lifecycle (read, write, remove)
//!   - [`core::processed_set`] - Filenames already handled this run
//! - [`io`] - CSV parsing and error report serialization
//! - [`strategy`] - Run strategies: one-shot scan or directory watching
//!
//! # Input Format
//!
//! Every file has a header line and five columns:
//!
//! ```text
//! INTERNAL_ID,FIRST_NAME,MIDDLE_NAME,LAST_NAME,PHONE_NUM
//! 12345678,Bobby,,Tables,555-555-5555
//! ```
//!
//! # Outputs
//!
//! - `<output>/<name>.json`: every record, valid or not
//! - `<errors>/<name>.csv`: `LINE_NUM,ERROR_MSG` lines, only when a row failed

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{process, Directories, FileProcessor, Outcome, PipelineOutput, ProcessedSet};
pub use crate::io::render_errors_as_csv;
pub use crate::types::{FieldViolation, IngestError, PersonName, Record, RowError};
