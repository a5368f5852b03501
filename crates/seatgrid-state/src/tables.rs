//! redb table definitions for the SeatGrid term store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized domain types).
//! Every key except a term's own starts with `{term_id}/`. Ids never contain
//! `/` or `:`, which the store enforces on write.

use redb::TableDefinition;

/// Terms keyed by `{term_id}`.
pub const TERMS: TableDefinition<&str, &[u8]> = TableDefinition::new("terms");

/// Courses keyed by `{term_id}/{course_id}`.
pub const COURSES: TableDefinition<&str, &[u8]> = TableDefinition::new("courses");

/// Student selections keyed by `{term_id}/{user_id}:{rank}`.
pub const SELECTIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("selections");

/// Assignments keyed by `{term_id}/{user_id}`.
pub const ASSIGNMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("assignments");

/// Key prefix shared by all rows of a term.
pub fn term_prefix(term_id: &str) -> String {
    format!("{term_id}/")
}
