//! Shared types used across SeatGrid crates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a requester (a student).
pub type RequesterId = String;

/// Identifier of a capacity-limited resource (a course section).
pub type ResourceId = String;

/// Identifier of the planning period that scopes preferences and capacities.
pub type TermId = String;

/// Requester-assigned priority. 1 is the most preferred.
pub type Rank = u32;

/// One ranked choice submitted by a requester for a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub requester_id: RequesterId,
    pub resource_id: ResourceId,
    pub rank: Rank,
    /// Capacity of the resource as seen when the row was loaded.
    /// Informational only; allocation reads capacities from [`CapacityTable`].
    #[serde(default)]
    pub resource_capacity: Option<u32>,
}

impl PreferenceRecord {
    pub fn new(requester_id: impl Into<String>, resource_id: impl Into<String>, rank: Rank) -> Self {
        Self {
            requester_id: requester_id.into(),
            resource_id: resource_id.into(),
            rank,
            resource_capacity: None,
        }
    }
}

/// Seat capacity per resource for one term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapacityTable {
    seats: BTreeMap<ResourceId, u32>,
}

impl CapacityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capacity of a resource, replacing any previous value.
    pub fn insert(&mut self, resource_id: impl Into<String>, capacity: u32) {
        self.seats.insert(resource_id.into(), capacity);
    }

    /// Capacity of `resource_id`. Unknown resources have capacity 0.
    pub fn capacity_of(&self, resource_id: &str) -> u32 {
        match self.seats.get(resource_id) {
            Some(capacity) => *capacity,
            None => 0,
        }
    }

    pub fn contains(&self, resource_id: &str) -> bool {
        self.seats.contains_key(resource_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, u32)> {
        self.seats.iter().map(|(id, cap)| (id, *cap))
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn total_seats(&self) -> u64 {
        self.seats.values().map(|c| u64::from(*c)).sum()
    }
}

impl<K: Into<String>> FromIterator<(K, u32)> for CapacityTable {
    fn from_iter<I: IntoIterator<Item = (K, u32)>>(iter: I) -> Self {
        Self {
            seats: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Final pairing of one requester to one resource at the rank they gave it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub requester_id: RequesterId,
    pub resource_id: ResourceId,
    pub rank: Rank,
}

/// The assignments produced by one run. Holds at most one entry per requester.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSet {
    by_requester: BTreeMap<RequesterId, Assignment>,
}

impl AssignmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment. Returns `false` and leaves the set untouched if the
    /// requester already holds one.
    pub fn insert(&mut self, assignment: Assignment) -> bool {
        if self.by_requester.contains_key(&assignment.requester_id) {
            return false;
        }
        self.by_requester
            .insert(assignment.requester_id.clone(), assignment);
        true
    }

    pub fn get(&self, requester_id: &str) -> Option<&Assignment> {
        self.by_requester.get(requester_id)
    }

    pub fn is_assigned(&self, requester_id: &str) -> bool {
        self.by_requester.contains_key(requester_id)
    }

    /// Assignments ordered by requester id.
    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.by_requester.values()
    }

    pub fn len(&self) -> usize {
        self.by_requester.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_requester.is_empty()
    }

    /// Number of requesters placed into `resource_id`.
    pub fn count_for(&self, resource_id: &str) -> usize {
        self.iter().filter(|a| a.resource_id == resource_id).count()
    }

    /// Status label for the selection row `(requester_id, resource_id)`.
    pub fn status_for(&self, requester_id: &str, resource_id: &str) -> SelectionStatus {
        match self.get(requester_id) {
            Some(a) if a.resource_id == resource_id => SelectionStatus::Assigned,
            _ => SelectionStatus::NotAssigned,
        }
    }
}

/// Outcome label stored on each submitted selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStatus {
    /// Submitted, no optimization run has covered it yet.
    #[default]
    Pending,
    Assigned,
    NotAssigned,
}

impl SelectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SelectionStatus::Pending => "pending",
            SelectionStatus::Assigned => "assigned",
            SelectionStatus::NotAssigned => "not_assigned",
        }
    }
}
