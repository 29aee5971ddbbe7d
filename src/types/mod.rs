//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `record`: Records and names built from CSV rows
//! - `row_error`: Row-level validation complaints
//! - `error`: Error types that abort a file or the service

pub mod error;
pub mod record;
pub mod row_error;

pub use error::{IngestError, Result};
pub use record::{InternalId, PersonName, Record};
pub use row_error::{FieldViolation, RowError};
