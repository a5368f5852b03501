//! Type conversions between term store rows and engine types.
//!
//! Bridges `seatgrid_state::{Selection, Course, AssignmentRecord}` to the
//! engine's `PreferenceRecord`, `CapacityTable` and `AssignmentSet`.

use std::collections::HashMap;

use seatgrid_core::{AssignmentSet, CapacityTable, PreferenceRecord};
use seatgrid_state::{AssignmentRecord, Course, Selection};

/// Convert stored selections to preference rows, echoing each course's
/// capacity. Selections naming a course not in `courses` carry `None`.
pub fn selections_to_records(selections: &[Selection], courses: &[Course]) -> Vec<PreferenceRecord> {
    let capacity: HashMap<&str, u32> = courses
        .iter()
        .map(|c| (c.id.as_str(), c.capacity))
        .collect();

    selections
        .iter()
        .map(|s| PreferenceRecord {
            requester_id: s.user_id.clone(),
            resource_id: s.course_id.clone(),
            rank: s.rank,
            resource_capacity: capacity.get(s.course_id.as_str()).copied(),
        })
        .collect()
}

/// Capacity table of a term's courses.
pub fn courses_to_capacities(courses: &[Course]) -> CapacityTable {
    courses
        .iter()
        .map(|c| (c.id.clone(), c.capacity))
        .collect()
}

/// Rows to persist for an assignment set, stamped with `assigned_at`.
pub fn assignments_to_records(
    term_id: &str,
    assignments: &AssignmentSet,
    assigned_at: u64,
) -> Vec<AssignmentRecord> {
    assignments
        .iter()
        .map(|a| AssignmentRecord {
            term_id: term_id.to_string(),
            user_id: a.requester_id.clone(),
            course_id: a.resource_id.clone(),
            assigned_rank: a.rank,
            assigned_at,
        })
        .collect()
}
