//! Core business logic module
//!
//! This module contains the conversion and file lifecycle components:
//! - `validators` - Per-field validation rules
//! - `record_builder` - Record construction with row error collection
//! - `pipeline` - CSV text to JSON + error report
//! - `processed_set` - Thread-safe idempotence state for filenames
//! - `file_processor` - Read, convert, write, remove for one file

pub mod file_processor;
pub mod pipeline;
pub mod processed_set;
pub mod record_builder;
pub mod validators;

pub use file_processor::{base_name, Directories, FileProcessor, FileReport, Outcome};
pub use pipeline::{process, PipelineOutput};
pub use processed_set::{Claim, ProcessedSet};
pub use record_builder::{build, Built};
