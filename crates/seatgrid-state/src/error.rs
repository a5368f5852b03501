//! Error types for the SeatGrid term store.

use thiserror::Error;

use seatgrid_core::TermId;

/// Result type alias for term store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during term store operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("preference rank must be between 1 and {max}, got {rank}")]
    InvalidRank { rank: u32, max: u32 },

    /// Ids form the table keys, so the key separators may not appear in them.
    #[error("invalid {kind} id {id:?}: must be non-empty and contain neither '/' nor ':'")]
    InvalidId { kind: &'static str, id: String },

    #[error("term {term_id} is not currently accepting selections")]
    TermInactive { term_id: TermId },

    #[error("selection period for term {term_id} runs {opens_at}..={closes_at}, got {now}")]
    SelectionClosed {
        term_id: TermId,
        now: u64,
        opens_at: u64,
        closes_at: u64,
    },
}
