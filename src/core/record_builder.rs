//! Record construction from parsed CSV rows
//!
//! Turns the rows produced by [`crate::io::parse`] into [`Record`]s while
//! collecting row errors on the side. A bad field never stops the batch: the
//! record is still built and emitted, and the problem goes to the error report.
//! Only a structurally broken row (wrong cell count) aborts the batch.

use crate::core::validators::validate_record;
use crate::io::RawRow;
use crate::types::{FieldViolation, InternalId, PersonName, Record, Result, RowError};
use log::debug;

/// Records built from one batch, plus every complaint about them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Built {
    /// One record per data row, in row order, valid or not
    pub records: Vec<Record>,
    /// Row errors in row order, then check order within a row
    pub row_errors: Vec<RowError>,
}

/// Build records from parsed rows
///
/// Row 0 is the header and is skipped. The data row at index `i` (0-based
/// among data rows) is reported as line `i + 2`.
///
/// # Errors
///
/// Returns `IngestError::StructuralRow` when a data row does not have exactly
/// five cells.
pub fn build(rows: &[Vec<String>]) -> Result<Built> {
    let mut built = Built::default();

    for (i, cells) in rows.iter().skip(1).enumerate() {
        let line_number = i + 2;
        let raw = RawRow::from_cells(line_number, cells)?;

        let (record, parse_error) = build_record(raw);
        if let Some(violation) = parse_error {
            built.row_errors.push(RowError::new(line_number, violation));
        }

        let violations = validate_record(&record);
        if !violations.is_empty() {
            debug!("Line {}: {} validation error(s)", line_number, violations.len());
        }
        built.row_errors.extend(
            violations
                .into_iter()
                .map(|violation| RowError::new(line_number, violation)),
        );

        built.records.push(record);
    }

    Ok(built)
}

/// Build one record, reporting an id that does not parse
///
/// An unparsable id is carried as 0 so the row is still emitted.
fn build_record(raw: RawRow) -> (Record, Option<FieldViolation>) {
    let (internal_id, parse_error) = match raw.internal_id.parse::<InternalId>() {
        Ok(id) => (id, None),
        Err(_) => (0, Some(FieldViolation::UnparsableId)),
    };

    let record = Record {
        internal_id,
        name: PersonName {
            first: raw.first_name,
            middle: raw.middle_name,
            last: raw.last_name,
        },
        phone: raw.phone,
    };

    (record, parse_error)
}
