//! I/O module
//!
//! Handles CSV parsing and error report output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row parsing, row decoding, error report serialization)

pub mod csv_format;

pub use csv_format::{parse, render_errors_as_csv, RawRow, COLUMN_COUNT};
