//! Conversion pipeline from CSV text to the two output documents
//!
//! ```text
//! csv text ──parse──> rows ──build──> records + row errors
//!                                       │           │
//!                                  serde_json   render_errors_as_csv
//!                                       │           │
//!                               entities_json  error_report_csv
//! ```
//!
//! Parse and build failures propagate unchanged; there is no local recovery.

use crate::core::record_builder::{build, Built};
use crate::io::{parse, render_errors_as_csv};
use crate::types::{Result, RowError};

/// Both output documents for one input, plus the data they were made from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// Compact JSON array of every record, in row order
    pub entities_json: String,
    /// Error report, header line only when there were no row errors
    pub error_report_csv: String,
    pub record_count: usize,
    pub row_errors: Vec<RowError>,
}

impl PipelineOutput {
    pub fn has_row_errors(&self) -> bool {
        !self.row_errors.is_empty()
    }
}

/// Run CSV text through the whole pipeline
///
/// # Errors
///
/// - `IngestError::MalformedInput` if the text is not well-formed CSV
/// - `IngestError::StructuralRow` if a row does not have five cells
/// - `IngestError::Serialization` if an output document cannot be encoded
pub fn process(csv_text: &str) -> Result<PipelineOutput> {
    let rows = parse(csv_text)?;
    let Built {
        records,
        row_errors,
    } = build(&rows)?;

    let entities_json = serde_json::to_string(&records)?;
    let error_report_csv = render_errors_as_csv(&row_errors)?;

    Ok(PipelineOutput {
        entities_json,
        error_report_csv,
        record_count: records.len(),
        row_errors,
    })
}
