//! Store error types.

use crate::domain::{DomainError, LineId, SequenceError, StationId};

/// Errors that can occur when reading or changing stored records.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another station already uses this name
    #[error("station name already exists: {0}")]
    DuplicateStationName(String),

    /// Another line already uses this name
    #[error("line name already exists: {0}")]
    DuplicateLineName(String),

    /// No station with this id
    #[error("station {0} not found")]
    StationNotFound(StationId),

    /// No line with this id
    #[error("line {0} not found")]
    LineNotFound(LineId),

    /// Line sequence operation failed
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// Record failed validation
    #[error(transparent)]
    Invalid(#[from] DomainError),

    /// Reading or writing the snapshot file failed
    #[error("snapshot error: {message}")]
    Snapshot { message: String },
}
