//! Satisfaction scoring.

use seatgrid_core::Rank;

/// Score of a first-choice assignment; the per-requester maximum.
pub const MAX_SATISFACTION: u32 = 3;

/// Utility of being assigned at `rank`: 1st → 3, 2nd → 2, 3rd → 1.
/// Any other rank scores 0.
pub fn satisfaction_score(rank: Rank) -> u32 {
    match rank {
        1 => 3,
        2 => 2,
        3 => 1,
        _ => 0,
    }
}
