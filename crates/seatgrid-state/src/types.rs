//! Domain types for the SeatGrid term store.
//!
//! These types represent the persisted state of terms, courses, student
//! selections and assignments. All types are serializable to/from JSON
//! for storage in redb tables.

use serde::{Deserialize, Serialize};

use seatgrid_core::{Rank, RequesterId, ResourceId, SelectionStatus, TermId};

/// Highest preference rank a student may submit.
pub const MAX_PREFERENCE_RANK: Rank = 3;

// ── Term ──────────────────────────────────────────────────────────

/// A planning period with its selection window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Term {
    pub id: TermId,
    pub name: String,
    /// Whether the term accepts selections at all.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Unix timestamp (seconds) when selections open.
    #[serde(default)]
    pub selection_opens_at: u64,
    /// Unix timestamp (seconds) when selections close.
    #[serde(default = "far_future")]
    pub selection_closes_at: u64,
}

fn default_true() -> bool {
    true
}

fn far_future() -> u64 {
    u64::MAX
}

impl Term {
    /// Whether a selection submitted at `now` falls inside the window.
    pub fn window_open(&self, now: u64) -> bool {
        now >= self.selection_opens_at && now <= self.selection_closes_at
    }
}

// ── Course ────────────────────────────────────────────────────────

/// A course section with a fixed number of seats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: ResourceId,
    pub term_id: TermId,
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub capacity: u32,
}

impl Course {
    /// Build the composite key for the courses table.
    pub fn table_key(&self) -> String {
        format!("{}/{}", self.term_id, self.id)
    }
}

// ── Selection ─────────────────────────────────────────────────────

/// A student's ranked choice of one course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Selection {
    pub term_id: TermId,
    pub user_id: RequesterId,
    pub course_id: ResourceId,
    pub rank: Rank,
    #[serde(default)]
    pub status: SelectionStatus,
    /// Unix timestamp of the last submission for this rank.
    #[serde(default)]
    pub updated_at: u64,
}

impl Selection {
    /// Build the composite key for the selections table.
    pub fn table_key(&self) -> String {
        selection_key(&self.term_id, &self.user_id, self.rank)
    }
}

pub(crate) fn selection_key(term_id: &str, user_id: &str, rank: Rank) -> String {
    format!("{term_id}/{user_id}:{rank}")
}

// ── Assignment ────────────────────────────────────────────────────

/// A persisted assignment produced by an optimization run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentRecord {
    pub term_id: TermId,
    pub user_id: RequesterId,
    pub course_id: ResourceId,
    pub assigned_rank: Rank,
    /// Unix timestamp of the run that produced this row.
    pub assigned_at: u64,
}

impl AssignmentRecord {
    /// Build the composite key for the assignments table.
    pub fn table_key(&self) -> String {
        format!("{}/{}", self.term_id, self.user_id)
    }
}

// ── Demand ────────────────────────────────────────────────────────

/// Requests against one course, counted over distinct students.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseDemand {
    pub course_id: ResourceId,
    pub code: String,
    pub capacity: u32,
    pub current_requests: u32,
    /// Capacity minus requests. Negative when oversubscribed.
    pub seats_remaining: i64,
}

// ── Import ────────────────────────────────────────────────────────

/// A whole term as loaded from a dataset file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TermDataset {
    pub term: Term,
    #[serde(default)]
    pub courses: Vec<DatasetCourse>,
    #[serde(default)]
    pub selections: Vec<DatasetSelection>,
}

/// Course row of a dataset; the term comes from the enclosing dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetCourse {
    pub id: ResourceId,
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub capacity: u32,
}

/// Selection row of a dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetSelection {
    pub user: RequesterId,
    pub course: ResourceId,
    pub rank: Rank,
}

/// Current unix time in seconds.
pub fn now_epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
