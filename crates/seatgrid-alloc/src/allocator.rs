//! Randomized greedy allocation.
//!
//! Requesters are visited once each in the order produced by
//! [`ProcessingOrder`]. Each takes the best-ranked resource that still has
//! a free seat; a requester whose every choice is full stays unassigned.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, warn};

use seatgrid_core::{Assignment, AssignmentSet, CapacityTable, RequesterId, ResourceId};

use crate::index::PreferenceIndex;
use crate::order::ProcessingOrder;

/// Result of one allocation pass.
#[derive(Debug, Clone, Default)]
pub struct Allocation {
    pub assignments: AssignmentSet,
    /// Requesters in the order they were processed.
    pub order: Vec<RequesterId>,
    /// Requesters left without a seat, in processing order.
    pub unassigned: Vec<RequesterId>,
    /// Resources named in preferences but missing from the capacity table.
    pub unknown_resources: BTreeSet<ResourceId>,
    /// Shuffle seed, when the order was seeded.
    pub seed: Option<u64>,
}

/// Seat counters for a single pass. Counts only move through [`Enrollment::try_seat`].
struct Enrollment<'a> {
    capacities: &'a CapacityTable,
    seated: HashMap<&'a str, u32>,
}

impl<'a> Enrollment<'a> {
    fn new(capacities: &'a CapacityTable) -> Self {
        let seated = capacities.iter().map(|(id, _)| (id.as_str(), 0)).collect();
        Self { capacities, seated }
    }

    /// Take a seat in `resource_id` if one is free.
    fn try_seat(&mut self, resource_id: &str) -> bool {
        let capacity = self.capacities.capacity_of(resource_id);
        match self.seated.get_mut(resource_id) {
            Some(count) if *count < capacity => {
                *count += 1;
                true
            }
            _ => false,
        }
    }
}

/// Assign every requester of `index` to at most one resource.
///
/// Guarantees for the returned set:
/// - no resource holds more requesters than its capacity
/// - no requester appears twice
/// - each assignment matches a (resource, rank) the requester submitted
/// - a requester is unassigned only if all their choices were full when visited
pub fn allocate(
    index: &PreferenceIndex,
    capacities: &CapacityTable,
    order: &ProcessingOrder,
) -> Allocation {
    let visit = order.arrange(index);
    let mut enrollment = Enrollment::new(capacities);
    let mut assignments = AssignmentSet::new();
    let mut unassigned = Vec::new();

    let unknown_resources: BTreeSet<ResourceId> = index
        .resources()
        .filter(|id| !capacities.contains(id))
        .cloned()
        .collect();
    for id in &unknown_resources {
        warn!(resource = %id, "resource has no capacity entry, treating as full");
    }

    for requester_id in &visit {
        let seat = index
            .choices(requester_id)
            .iter()
            .find(|choice| enrollment.try_seat(&choice.resource_id));

        match seat {
            Some(choice) => {
                debug!(
                    requester = %requester_id,
                    resource = %choice.resource_id,
                    rank = choice.rank,
                    "assigned"
                );
                assignments.insert(Assignment {
                    requester_id: requester_id.clone(),
                    resource_id: choice.resource_id.clone(),
                    rank: choice.rank,
                });
            }
            None => {
                debug!(requester = %requester_id, "no ranked resource has a free seat");
                unassigned.push(requester_id.clone());
            }
        }
    }

    info!(
        requesters = visit.len(),
        assigned = assignments.len(),
        unassigned = unassigned.len(),
        "allocation pass complete"
    );

    Allocation {
        assignments,
        order: visit,
        unassigned,
        unknown_resources,
        seed: order.seed(),
    }
}
