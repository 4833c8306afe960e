use thiserror::Error;

use crate::types::RecordId;

/// Code reported for faults that have no more specific classification.
pub const INTERNAL_ERROR_CODE: &str = "internal";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Record {origin}#{id} is missing required field '{field}'")]
    MissingField {
        origin: &'static str,
        id: RecordId,
        field: &'static str,
    },

    #[error("Record {origin}#{id} appears more than once")]
    DuplicateId { origin: &'static str, id: RecordId },

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Stable, machine-readable code for callers that must not parse messages.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidConfig(_) => "invalid_config",
            Error::NotFound(_) => "not_found",
            Error::MissingField { .. } => "missing_field",
            Error::DuplicateId { .. } => "duplicate_id",
            Error::Operation(_) => INTERNAL_ERROR_CODE,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
