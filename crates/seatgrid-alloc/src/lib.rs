//! SeatGrid assignment engine — preference indexing, randomized greedy
//! allocation, satisfaction reporting.
//!
//! Turns (requester, resource, rank) rows plus per-resource capacities into
//! a one-to-one assignment. The engine is synchronous and holds no state
//! between runs; the shuffle seed is the only source of variation.
//!
//! # Components
//!
//! - **`index`** — Preference indexing (per requester, per resource)
//! - **`validate`** — Strict rejection of rank-0 and duplicate rows
//! - **`order`** — Seeded or fixed processing order
//! - **`allocator`** — Greedy pass under capacity limits
//! - **`scorer`** — Rank → satisfaction score
//! - **`report`** — Run statistics and text report
//! - **`convert`** — Type conversions from term store rows

pub mod allocator;
pub mod convert;
pub mod error;
pub mod index;
pub mod order;
pub mod report;
pub mod scorer;
pub mod validate;

pub use allocator::{Allocation, allocate};
pub use convert::{assignments_to_records, courses_to_capacities, selections_to_records};
pub use error::{AllocError, AllocResult};
pub use index::{PreferenceIndex, RankedChoice};
pub use order::ProcessingOrder;
pub use report::{RunStatistics, format_report};
pub use scorer::{MAX_SATISFACTION, satisfaction_score};
pub use validate::validate_records;

use tracing::info;

use seatgrid_core::{CapacityTable, PreferenceRecord};

/// Allocation plus the statistics computed from it.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub allocation: Allocation,
    pub statistics: RunStatistics,
}

impl RunOutcome {
    /// True when no preferences were supplied.
    pub fn is_empty(&self) -> bool {
        self.statistics.total_requesters == 0
    }
}

/// Index `records`, allocate under `capacities` and compute statistics.
///
/// No preferences is a normal outcome: an empty assignment set and
/// zeroed statistics.
pub fn optimize(
    records: &[PreferenceRecord],
    capacities: &CapacityTable,
    order: &ProcessingOrder,
) -> RunOutcome {
    if records.is_empty() {
        info!("no preferences supplied, nothing to allocate");
        return RunOutcome {
            allocation: Allocation {
                seed: order.seed(),
                ..Allocation::default()
            },
            statistics: RunStatistics::default(),
        };
    }

    let index = PreferenceIndex::build(records);
    let allocation = allocate(&index, capacities, order);
    let statistics = RunStatistics::compute(&index, &allocation.assignments);
    info!(
        assigned = statistics.assigned,
        unassigned = statistics.unassigned,
        satisfaction = statistics.satisfaction_percent,
        "optimization finished"
    );
    RunOutcome {
        allocation,
        statistics,
    }
}
