//! Patient identifiers.
//!
//! Patients are identified by a UUID v4 allocated by the repository at creation time. PUW uses a
//! *canonical* textual form everywhere an identifier crosses a boundary (REST paths, CLI
//! arguments, upstream prediction requests): **32 lowercase hexadecimal characters** without
//! hyphens, e.g. `550e8400e29b41d4a716446655440000`.
//!
//! Identifiers supplied from outside must already be canonical; [`PatientId::parse`] rejects
//! uppercase, hyphenated or otherwise malformed input rather than normalising it.

mod patient_id;

pub use patient_id::PatientId;
pub use ::uuid::Uuid;

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
