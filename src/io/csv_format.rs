//! CSV format handling for input rows and the error report
//!
//! This module centralizes all CSV format concerns, providing:
//! - Parsing CSV text into rows of cells
//! - RawRow, the fixed five-column row decoded at the boundary
//! - Error report serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{IngestError, Result, RowError};
use csv::{ReaderBuilder, Trim, Writer};

/// Number of columns every row must have
pub const COLUMN_COUNT: usize = 5;

/// Header line of the error report
pub const ERROR_REPORT_HEADER: [&str; 2] = ["LINE_NUM", "ERROR_MSG"];

/// One data row decoded into its fixed positional schema
///
/// Column order is `INTERNAL_ID, FIRST_NAME, MIDDLE_NAME, LAST_NAME, PHONE_NUM`.
/// Cells are kept exactly as read (no trimming).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub internal_id: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub phone: String,
}

impl RawRow {
    /// Decode a row of cells, failing when it is not exactly five wide
    ///
    /// # Arguments
    ///
    /// * `line_number` - 1-based line number of the row, used in the error
    /// * `cells` - The row's cells in column order
    pub fn from_cells(line_number: usize, cells: &[String]) -> Result<Self> {
        match cells {
            [internal_id, first_name, middle_name, last_name, phone] => Ok(RawRow {
                internal_id: internal_id.clone(),
                first_name: first_name.clone(),
                middle_name: middle_name.clone(),
                last_name: last_name.clone(),
                phone: phone.clone(),
            }),
            _ => Err(IngestError::structural_row(
                line_number,
                COLUMN_COUNT,
                cells.len(),
            )),
        }
    }
}

/// Parse CSV text into rows of cells
///
/// The header is kept as the first row. Blank lines are skipped and both `\n`
/// and `\r\n` terminators are accepted.
///
/// # Errors
///
/// Returns `IngestError::MalformedInput` when a field is badly quoted or when
/// rows do not all have the same number of cells.
pub fn parse(text: &str) -> Result<Vec<Vec<String>>> {
    check_quoting(text)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .trim(Trim::None)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(rows)
}

/// Position of the quote scanner within the current field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A `"` was seen inside a quoted field: either an escape or the close
    QuoteInQuoted,
}

/// Reject text whose quoting the csv reader would silently repair
///
/// The csv reader keeps bare quotes inside unquoted fields, joins text that
/// follows a closing quote onto the field, and runs an unterminated quoted
/// field to the end of input. All three are malformed here:
/// - a `"` may only open a field at its start
/// - a closing `"` must be followed by `,`, a line break or end of input
/// - a quoted field must be closed
fn check_quoting(text: &str) -> Result<()> {
    let mut state = QuoteState::FieldStart;
    let mut opened_at = 0u64;
    let mut line = 1u64;

    for c in text.chars() {
        state = match (state, c) {
            (QuoteState::Quoted, '"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, '\n') => {
                line += 1;
                QuoteState::Quoted
            }
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, '"') => QuoteState::Quoted,
            (QuoteState::FieldStart, '"') => {
                opened_at = line;
                QuoteState::Quoted
            }
            (QuoteState::Unquoted, '"') => {
                return Err(IngestError::malformed(
                    Some(line),
                    "bare quote in unquoted field",
                ));
            }
            (_, '\n') => {
                line += 1;
                QuoteState::FieldStart
            }
            (_, ',' | '\r') => QuoteState::FieldStart,
            (QuoteState::QuoteInQuoted, _) => {
                return Err(IngestError::malformed(
                    Some(line),
                    "unexpected text after closing quote",
                ));
            }
            (QuoteState::FieldStart | QuoteState::Unquoted, _) => QuoteState::Unquoted,
        };
    }

    if state == QuoteState::Quoted {
        return Err(IngestError::malformed(
            Some(opened_at),
            "unterminated quoted field",
        ));
    }

    Ok(())
}

/// Render row errors as the CSV error report
///
/// Writes the header `LINE_NUM,ERROR_MSG` followed by one `<line>,<message>`
/// line per error, in the order given. An empty slice yields the header only.
///
/// # Errors
///
/// Returns `IngestError::Serialization` if the CSV writer fails.
pub fn render_errors_as_csv(row_errors: &[RowError]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());

    writer
        .write_record(ERROR_REPORT_HEADER)
        .map_err(|e| serialization_error("Failed to write error report header", &e))?;

    for row_error in row_errors {
        writer
            .write_record([row_error.line_number.to_string(), row_error.message.clone()])
            .map_err(|e| serialization_error("Failed to write error report line", &e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| IngestError::Serialization {
            message: format!("Failed to flush error report: {}", e),
        })?;

    String::from_utf8(bytes).map_err(|e| IngestError::Serialization {
        message: format!("Error report is not valid UTF-8: {}", e),
    })
}

fn serialization_error(context: &str, error: &csv::Error) -> IngestError {
    IngestError::Serialization {
        message: format!("{}: {}", context, error),
    }
}
