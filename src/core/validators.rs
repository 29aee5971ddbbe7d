//! Field validators
//!
//! Each validator checks one field against a fixed rule and returns the
//! matching [`FieldViolation`] on failure. They have no side effects.
//!
//! [`validate_record`] runs all of them in the fixed report order and collects
//! every violation instead of stopping at the first one.

use crate::types::{FieldViolation, InternalId, Record};
use regex::Regex;
use std::sync::LazyLock;

/// Longest accepted name, in characters
pub const MAX_NAME_LEN: usize = 15;

/// Number of decimal digits an internal id must have
pub const INTERNAL_ID_DIGITS: usize = 8;

// ASCII digits only; `\d` would also accept other Unicode digits.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{3}-[0-9]{3}-[0-9]{4}$").expect("phone pattern is a valid regex")
});

fn required_name(
    value: &str,
    required: FieldViolation,
    too_long: FieldViolation,
) -> Result<(), FieldViolation> {
    if value.is_empty() {
        return Err(required);
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(too_long);
    }
    Ok(())
}

pub fn validate_first_name(value: &str) -> Result<(), FieldViolation> {
    required_name(
        value,
        FieldViolation::FirstNameRequired,
        FieldViolation::FirstNameTooLong,
    )
}

pub fn validate_last_name(value: &str) -> Result<(), FieldViolation> {
    required_name(
        value,
        FieldViolation::LastNameRequired,
        FieldViolation::LastNameTooLong,
    )
}

/// Middle name is optional, so only its length is checked
pub fn validate_middle_name(value: &str) -> Result<(), FieldViolation> {
    if value.chars().count() > MAX_NAME_LEN {
        return Err(FieldViolation::MiddleNameTooLong);
    }
    Ok(())
}

/// Internal id must be positive with exactly eight decimal digits
///
/// The digit count comes from the decimal representation, so zero and
/// negative values fail on the sign check and are reported once.
pub fn validate_internal_id(value: InternalId) -> Result<(), FieldViolation> {
    if value <= 0 || value.to_string().len() != INTERNAL_ID_DIGITS {
        return Err(FieldViolation::InvalidInternalId);
    }
    Ok(())
}

pub fn validate_phone_number(value: &str) -> Result<(), FieldViolation> {
    if PHONE_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(FieldViolation::InvalidPhoneNumber)
    }
}

/// Run every field check against a record
///
/// Order is first name, last name, middle name, internal id, phone.
pub fn validate_record(record: &Record) -> Vec<FieldViolation> {
    [
        validate_first_name(&record.name.first),
        validate_last_name(&record.name.last),
        validate_middle_name(&record.name.middle),
        validate_internal_id(record.internal_id),
        validate_phone_number(&record.phone),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}
