//! Record types produced from CSV rows
//!
//! A [`Record`] is built for every data row, valid or not. The JSON output is
//! the serde serialization of a `Vec<Record>`, so field order and naming here
//! define the output shape:
//!
//! ```text
//! {"id":12345678,"name":{"first":"Bobby","last":"Tables"},"phone":"555-555-5555"}
//! ```

use serde::{Deserialize, Serialize};

/// Internal identifier of a person
///
/// Signed so that negative values in the input survive into the record and
/// are reported by validation rather than rejected by parsing.
pub type InternalId = i64;

/// A person's name as given in the CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub first: String,

    /// Omitted from the JSON output when empty
    #[serde(skip_serializing_if = "String::is_empty")]
    pub middle: String,

    pub last: String,
}

/// Structured form of one CSV data row
///
/// Carries the values exactly as read, including ones that fail validation.
/// Only the accompanying error report tells valid and invalid records apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Parsed INTERNAL_ID, or 0 when the cell was not an integer
    #[serde(rename = "id")]
    pub internal_id: InternalId,

    pub name: PersonName,

    pub phone: String,
}

impl Record {
    pub fn new(internal_id: InternalId, name: PersonName, phone: impl Into<String>) -> Self {
        Record {
            internal_id,
            name,
            phone: phone.into(),
        }
    }
}

impl PersonName {
    pub fn new(
        first: impl Into<String>,
        middle: impl Into<String>,
        last: impl Into<String>,
    ) -> Self {
        PersonName {
            first: first.into(),
            middle: middle.into(),
            last: last.into(),
        }
    }
}
