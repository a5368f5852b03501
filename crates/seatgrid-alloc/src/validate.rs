//! Strict input checks run before indexing.
//!
//! Ranks above the scored range are accepted: they can still be satisfied,
//! they just score 0.

use std::collections::HashMap;

use seatgrid_core::PreferenceRecord;

use crate::error::{AllocError, AllocResult};

/// Reject rank-0 rows and requesters that rank the same resource twice.
pub fn validate_records(records: &[PreferenceRecord]) -> AllocResult<()> {
    let mut first_rank: HashMap<(&str, &str), u32> = HashMap::new();

    for rec in records {
        if rec.rank == 0 {
            return Err(AllocError::ZeroRank {
                requester_id: rec.requester_id.clone(),
                resource_id: rec.resource_id.clone(),
            });
        }
        let key = (rec.requester_id.as_str(), rec.resource_id.as_str());
        if let Some(first) = first_rank.insert(key, rec.rank) {
            return Err(AllocError::DuplicatePreference {
                requester_id: rec.requester_id.clone(),
                resource_id: rec.resource_id.clone(),
                first,
                second: rec.rank,
            });
        }
    }
    Ok(())
}
