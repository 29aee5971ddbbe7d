//! Row-level validation complaints
//!
//! These never abort a batch. They are accumulated per row and rendered into
//! the CSV error report by [`crate::io::render_errors_as_csv`].

use thiserror::Error;

/// A single field-level rule violation
///
/// The display text of each variant is the exact message written to the
/// error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldViolation {
    /// INTERNAL_ID cell is not an integer at all
    #[error("Failed to parse ID")]
    UnparsableId,

    #[error("FIRST_NAME is required")]
    FirstNameRequired,

    #[error("FIRST_NAME must be fewer than 15 characters")]
    FirstNameTooLong,

    #[error("LAST_NAME is required")]
    LastNameRequired,

    #[error("LAST_NAME must be fewer than 15 characters")]
    LastNameTooLong,

    #[error("MIDDLE_NAME must be fewer than 15 characters")]
    MiddleNameTooLong,

    #[error("INTERNAL_ID must be an 8 digit positive integer")]
    InvalidInternalId,

    #[error("PHONE_NUMBER should match pattern ###-###-####")]
    InvalidPhoneNumber,
}

/// A line-scoped complaint attached to an otherwise still emitted record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number, the header being line 1
    pub line_number: usize,
    pub message: String,
}

impl RowError {
    pub fn new(line_number: usize, violation: FieldViolation) -> Self {
        RowError {
            line_number,
            message: violation.to_string(),
        }
    }
}
