//! Engine error types.

use thiserror::Error;

use seatgrid_core::{RequesterId, ResourceId};

/// Input rejected by [`validate_records`](crate::validate::validate_records).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("rank 0 given by {requester_id} for {resource_id}; ranks start at 1")]
    ZeroRank {
        requester_id: RequesterId,
        resource_id: ResourceId,
    },

    #[error("{requester_id} ranked {resource_id} more than once (ranks {first} and {second})")]
    DuplicatePreference {
        requester_id: RequesterId,
        resource_id: ResourceId,
        first: u32,
        second: u32,
    },
}

pub type AllocResult<T> = Result<T, AllocError>;
