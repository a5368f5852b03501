//! TermStore — redb-backed persistence for SeatGrid.
//!
//! Provides typed operations over terms, courses, selections and
//! assignments. All values are JSON-serialized into redb's `&[u8]` value
//! columns. The store supports both on-disk and in-memory backends (the
//! latter for testing).

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, Table, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use seatgrid_core::{Rank, SelectionStatus};

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;

/// Thread-safe term store backed by redb.
#[derive(Clone)]
pub struct TermStore {
    db: Arc<Database>,
}

impl TermStore {
    /// Open (or create) a persistent term store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "term store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory term store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory term store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(TERMS).map_err(map_err!(Table))?;
        txn.open_table(COURSES).map_err(map_err!(Table))?;
        txn.open_table(SELECTIONS).map_err(map_err!(Table))?;
        txn.open_table(ASSIGNMENTS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Generic helpers ────────────────────────────────────────────

    fn put_json<T: Serialize>(&self, def: JsonTable, key: &str, value: &T) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(def).map_err(map_err!(Table))?;
            insert_json(&mut table, key, value)?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, def: JsonTable, key: &str) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(def).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let value: T =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn list_json<T: DeserializeOwned>(&self, def: JsonTable, prefix: &str) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(def).map_err(map_err!(Table))?;
        Ok(rows_with_prefix(&table, prefix)?
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }

    fn delete_key(&self, def: JsonTable, key: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(def).map_err(map_err!(Table))?;
            existed = table.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(existed)
    }

    // ── Terms ──────────────────────────────────────────────────────

    /// Insert or update a term.
    pub fn put_term(&self, term: &Term) -> StateResult<()> {
        check_id("term", &term.id)?;
        self.put_json(TERMS, &term.id, term)?;
        debug!(term = %term.id, "term stored");
        Ok(())
    }

    pub fn get_term(&self, term_id: &str) -> StateResult<Option<Term>> {
        self.get_json(TERMS, term_id)
    }

    pub fn list_terms(&self) -> StateResult<Vec<Term>> {
        self.list_json(TERMS, "")
    }

    fn require_term(&self, term_id: &str) -> StateResult<Term> {
        self.get_term(term_id)?
            .ok_or_else(|| StateError::NotFound(format!("term {term_id}")))
    }

    // ── Courses ────────────────────────────────────────────────────

    /// Insert or update a course.
    pub fn put_course(&self, course: &Course) -> StateResult<()> {
        check_id("term", &course.term_id)?;
        check_id("course", &course.id)?;
        let key = course.table_key();
        self.put_json(COURSES, &key, course)?;
        debug!(%key, capacity = course.capacity, "course stored");
        Ok(())
    }

    pub fn get_course(&self, term_id: &str, course_id: &str) -> StateResult<Option<Course>> {
        self.get_json(COURSES, &format!("{term_id}/{course_id}"))
    }

    /// All courses of a term, ordered by course id.
    pub fn list_courses(&self, term_id: &str) -> StateResult<Vec<Course>> {
        self.list_json(COURSES, &term_prefix(term_id))
    }

    /// Delete a course together with every selection that names it.
    /// Returns true if the course existed.
    pub fn delete_course(&self, term_id: &str, course_id: &str) -> StateResult<bool> {
        let key = format!("{term_id}/{course_id}");
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        let dropped;
        {
            let mut courses = txn.open_table(COURSES).map_err(map_err!(Table))?;
            existed = courses.remove(key.as_str()).map_err(map_err!(Write))?.is_some();

            let mut selections = txn.open_table(SELECTIONS).map_err(map_err!(Table))?;
            let stale: Vec<String> = rows_with_prefix::<Selection, _>(&selections, &term_prefix(term_id))?
                .into_iter()
                .filter(|(_, sel)| sel.course_id == course_id)
                .map(|(k, _)| k)
                .collect();
            for k in &stale {
                selections.remove(k.as_str()).map_err(map_err!(Write))?;
            }
            dropped = stale.len();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, existed, dropped_selections = dropped, "course deleted");
        Ok(existed)
    }

    // ── Selections ─────────────────────────────────────────────────

    /// Submit a student's choice for one rank.
    ///
    /// The term must exist, be active and have its selection window open at
    /// `now`; the course must belong to the term. Resubmitting a rank replaces
    /// the course previously held at that rank and resets the status.
    pub fn submit_selection(
        &self,
        term_id: &str,
        user_id: &str,
        course_id: &str,
        rank: Rank,
        now: u64,
    ) -> StateResult<Selection> {
        check_rank(rank)?;
        check_id("user", user_id)?;
        let term = self.require_term(term_id)?;
        if !term.is_active {
            return Err(StateError::TermInactive {
                term_id: term.id,
            });
        }
        if !term.window_open(now) {
            return Err(StateError::SelectionClosed {
                term_id: term.id,
                now,
                opens_at: term.selection_opens_at,
                closes_at: term.selection_closes_at,
            });
        }

        let selection = Selection {
            term_id: term_id.to_string(),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            rank,
            status: SelectionStatus::Pending,
            updated_at: now,
        };
        self.put_selection(&selection)?;
        info!(term = term_id, user = user_id, course = course_id, rank, "selection saved");
        Ok(selection)
    }

    /// Store a selection without the term window checks (bulk import).
    /// Rank range and course existence are still enforced.
    pub fn put_selection(&self, selection: &Selection) -> StateResult<()> {
        check_selection(selection)?;
        if self
            .get_course(&selection.term_id, &selection.course_id)?
            .is_none()
        {
            return Err(StateError::NotFound(format!(
                "course {}/{}",
                selection.term_id, selection.course_id
            )));
        }
        self.put_json(SELECTIONS, &selection.table_key(), selection)
    }

    /// Remove the selection a student holds at `rank`. Returns true if it existed.
    pub fn remove_selection(&self, term_id: &str, user_id: &str, rank: Rank) -> StateResult<bool> {
        let existed = self.delete_key(SELECTIONS, &selection_key(term_id, user_id, rank))?;
        debug!(term = term_id, user = user_id, rank, existed, "selection removed");
        Ok(existed)
    }

    /// Remove every selection of a student for a term. Returns number deleted.
    pub fn clear_selections(&self, term_id: &str, user_id: &str) -> StateResult<u32> {
        let prefix = format!("{term_id}/{user_id}:");
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let count;
        {
            let mut table = txn.open_table(SELECTIONS).map_err(map_err!(Table))?;
            let keys = keys_with_prefix(&table, &prefix)?;
            for key in &keys {
                table.remove(key.as_str()).map_err(map_err!(Write))?;
            }
            count = keys.len() as u32;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(term = term_id, user = user_id, count, "selections cleared");
        Ok(count)
    }

    /// All selections of a term, ordered by user then rank.
    pub fn list_selections(&self, term_id: &str) -> StateResult<Vec<Selection>> {
        let mut rows: Vec<Selection> = self.list_json(SELECTIONS, &term_prefix(term_id))?;
        rows.sort_by(|a, b| a.user_id.cmp(&b.user_id).then(a.rank.cmp(&b.rank)));
        Ok(rows)
    }

    /// A student's selections for a term, ordered by rank.
    pub fn list_selections_for_user(&self, term_id: &str, user_id: &str) -> StateResult<Vec<Selection>> {
        let mut rows: Vec<Selection> = self.list_json(SELECTIONS, &format!("{term_id}/{user_id}:"))?;
        rows.sort_by_key(|s| s.rank);
        Ok(rows)
    }

    /// Requests per course, counted over distinct students.
    pub fn course_demand(&self, term_id: &str) -> StateResult<Vec<CourseDemand>> {
        let courses = self.list_courses(term_id)?;
        let selections = self.list_selections(term_id)?;

        let mut requesters: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
        for sel in &selections {
            requesters
                .entry(sel.course_id.as_str())
                .or_default()
                .insert(sel.user_id.as_str());
        }

        Ok(courses
            .iter()
            .map(|course| {
                let current_requests = requesters
                    .get(course.id.as_str())
                    .map_or(0, |users| users.len() as u32);
                CourseDemand {
                    course_id: course.id.clone(),
                    code: course.code.clone(),
                    capacity: course.capacity,
                    current_requests,
                    seats_remaining: i64::from(course.capacity) - i64::from(current_requests),
                }
            })
            .collect())
    }

    // ── Assignments ────────────────────────────────────────────────

    /// Replace the assignment set of a term and relabel its selections.
    ///
    /// Runs in one write transaction: prior assignments of the term are
    /// removed, `records` are inserted, and every selection of the term is
    /// marked `assigned` or `not_assigned` by membership. Nothing is written
    /// if any step fails.
    pub fn replace_assignments(&self, term_id: &str, records: &[AssignmentRecord]) -> StateResult<()> {
        let prefix = term_prefix(term_id);
        let mut encoded = Vec::with_capacity(records.len());
        for record in records {
            if record.term_id != term_id {
                return Err(StateError::Write(format!(
                    "assignment for term {} passed while replacing term {term_id}",
                    record.term_id
                )));
            }
            check_id("user", &record.user_id)?;
            check_id("course", &record.course_id)?;
            let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
            encoded.push((record.table_key(), value));
        }
        let placed: HashSet<(&str, &str)> = records
            .iter()
            .map(|r| (r.user_id.as_str(), r.course_id.as_str()))
            .collect();

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let removed;
        let relabeled;
        {
            let mut assignments = txn.open_table(ASSIGNMENTS).map_err(map_err!(Table))?;
            let stale = keys_with_prefix(&assignments, &prefix)?;
            for key in &stale {
                assignments.remove(key.as_str()).map_err(map_err!(Write))?;
            }
            removed = stale.len();
            for (key, value) in &encoded {
                assignments
                    .insert(key.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }

            let mut selections = txn.open_table(SELECTIONS).map_err(map_err!(Table))?;
            let rows: Vec<(String, Selection)> = rows_with_prefix(&selections, &prefix)?;
            for (key, mut sel) in rows.iter().cloned() {
                sel.status = if placed.contains(&(sel.user_id.as_str(), sel.course_id.as_str())) {
                    SelectionStatus::Assigned
                } else {
                    SelectionStatus::NotAssigned
                };
                let value = serde_json::to_vec(&sel).map_err(map_err!(Serialize))?;
                selections
                    .insert(key.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }
            relabeled = rows.len();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        info!(
            term = term_id,
            removed,
            inserted = records.len(),
            relabeled,
            "assignment set replaced"
        );
        Ok(())
    }

    /// Stored assignments of a term, ordered by user id.
    pub fn list_assignments(&self, term_id: &str) -> StateResult<Vec<AssignmentRecord>> {
        self.list_json(ASSIGNMENTS, &term_prefix(term_id))
    }

    // ── Import ─────────────────────────────────────────────────────

    /// Load a dataset: the term, its courses and its selections.
    ///
    /// Everything is written in one transaction, so a bad row leaves the
    /// store as it was. Selections may name courses of the dataset or
    /// courses already stored for the term.
    /// Returns the number of courses and selections written.
    pub fn import_dataset(&self, dataset: &TermDataset) -> StateResult<(usize, usize)> {
        let term_id = dataset.term.id.as_str();
        check_id("term", term_id)?;

        let courses: Vec<Course> = dataset
            .courses
            .iter()
            .map(|c| Course {
                id: c.id.clone(),
                term_id: term_id.to_string(),
                code: c.code.clone(),
                name: c.name.clone(),
                capacity: c.capacity,
            })
            .collect();
        for course in &courses {
            check_id("course", &course.id)?;
        }

        let now = now_epoch_secs();
        let selections: Vec<Selection> = dataset
            .selections
            .iter()
            .map(|s| Selection {
                term_id: term_id.to_string(),
                user_id: s.user.clone(),
                course_id: s.course.clone(),
                rank: s.rank,
                status: SelectionStatus::Pending,
                updated_at: now,
            })
            .collect();
        for selection in &selections {
            check_selection(selection)?;
        }

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut terms = txn.open_table(TERMS).map_err(map_err!(Table))?;
            insert_json(&mut terms, term_id, &dataset.term)?;

            let mut course_table = txn.open_table(COURSES).map_err(map_err!(Table))?;
            for course in &courses {
                insert_json(&mut course_table, &course.table_key(), course)?;
            }

            let mut selection_table = txn.open_table(SELECTIONS).map_err(map_err!(Table))?;
            for selection in &selections {
                let course_key = format!("{term_id}/{}", selection.course_id);
                if course_table
                    .get(course_key.as_str())
                    .map_err(map_err!(Read))?
                    .is_none()
                {
                    // Dropping the uncommitted transaction discards the rows above.
                    return Err(StateError::NotFound(format!("course {course_key}")));
                }
                insert_json(&mut selection_table, &selection.table_key(), selection)?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        info!(
            term = term_id,
            courses = courses.len(),
            selections = selections.len(),
            "dataset imported"
        );
        Ok((courses.len(), selections.len()))
    }
}

fn check_rank(rank: Rank) -> StateResult<()> {
    if (1..=MAX_PREFERENCE_RANK).contains(&rank) {
        Ok(())
    } else {
        Err(StateError::InvalidRank {
            rank,
            max: MAX_PREFERENCE_RANK,
        })
    }
}

/// Reject ids that are empty or contain a key separator. Keys are built as
/// `{term}/{course}` and `{term}/{user}:{rank}`, so either character would
/// let one id's prefix scan reach another's rows.
fn check_id(kind: &'static str, id: &str) -> StateResult<()> {
    if id.is_empty() || id.contains(['/', ':']) {
        return Err(StateError::InvalidId {
            kind,
            id: id.to_string(),
        });
    }
    Ok(())
}

fn check_selection(selection: &Selection) -> StateResult<()> {
    check_rank(selection.rank)?;
    check_id("term", &selection.term_id)?;
    check_id("user", &selection.user_id)?;
    check_id("course", &selection.course_id)
}

fn insert_json<T: Serialize>(
    table: &mut Table<'_, &'static str, &'static [u8]>,
    key: &str,
    value: &T,
) -> StateResult<()> {
    let value = serde_json::to_vec(value).map_err(map_err!(Serialize))?;
    table
        .insert(key, value.as_slice())
        .map_err(map_err!(Write))?;
    Ok(())
}

fn keys_with_prefix<T>(table: &T, prefix: &str) -> StateResult<Vec<String>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let mut keys = Vec::new();
    for entry in table.iter().map_err(map_err!(Read))? {
        let (key, _) = entry.map_err(map_err!(Read))?;
        if key.value().starts_with(prefix) {
            keys.push(key.value().to_string());
        }
    }
    Ok(keys)
}

fn rows_with_prefix<V, T>(table: &T, prefix: &str) -> StateResult<Vec<(String, V)>>
where
    V: DeserializeOwned,
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let mut rows = Vec::new();
    for entry in table.iter().map_err(map_err!(Read))? {
        let (key, value) = entry.map_err(map_err!(Read))?;
        if key.value().starts_with(prefix) {
            let decoded: V =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            rows.push((key.value().to_string(), decoded));
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_term(id: &str) -> Term {
        Term {
            id: id.to_string(),
            name: format!("Term {id}"),
            is_active: true,
            selection_opens_at: 1000,
            selection_closes_at: 2000,
        }
    }

    fn test_course(term: &str, id: &str, capacity: u32) -> Course {
        Course {
            id: id.to_string(),
            term_id: term.to_string(),
            code: id.to_uppercase(),
            name: format!("Course {id}"),
            capacity,
        }
    }

    fn seeded_store() -> TermStore {
        let store = TermStore::open_in_memory().unwrap();
        store.put_term(&test_term("t1")).unwrap();
        store.put_course(&test_course("t1", "math", 2)).unwrap();
        store.put_course(&test_course("t1", "art", 1)).unwrap();
        store
    }

    fn record(term: &str, user: &str, course: &str, rank: Rank) -> AssignmentRecord {
        AssignmentRecord {
            term_id: term.to_string(),
            user_id: user.to_string(),
            course_id: course.to_string(),
            assigned_rank: rank,
            assigned_at: 1500,
        }
    }

    // ── Terms and courses ──────────────────────────────────────────

    #[test]
    fn term_put_and_get() {
        let store = TermStore::open_in_memory().unwrap();
        let term = test_term("t1");

        store.put_term(&term).unwrap();
        assert_eq!(store.get_term("t1").unwrap(), Some(term));
        assert!(store.get_term("t2").unwrap().is_none());
    }

    #[test]
    fn courses_are_scoped_to_term() {
        let store = seeded_store();
        store.put_term(&test_term("t10")).unwrap();
        store.put_course(&test_course("t10", "bio", 5)).unwrap();

        let t1 = store.list_courses("t1").unwrap();
        assert_eq!(t1.len(), 2);
        assert_eq!(store.list_courses("t10").unwrap().len(), 1);
        assert_eq!(store.get_course("t1", "math").unwrap().unwrap().capacity, 2);
    }

    #[test]
    fn course_update_in_place() {
        let store = seeded_store();
        store.put_course(&test_course("t1", "math", 30)).unwrap();

        let course = store.get_course("t1", "math").unwrap().unwrap();
        assert_eq!(course.capacity, 30);
        assert_eq!(store.list_courses("t1").unwrap().len(), 2);
    }

    #[test]
    fn delete_course_drops_its_selections() {
        let store = seeded_store();
        store.submit_selection("t1", "u1", "math", 1, 1500).unwrap();
        store.submit_selection("t1", "u1", "art", 2, 1500).unwrap();

        assert!(store.delete_course("t1", "math").unwrap());
        assert!(!store.delete_course("t1", "math").unwrap());

        let left = store.list_selections("t1").unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].course_id, "art");
    }

    // ── Selections ─────────────────────────────────────────────────

    #[test]
    fn submit_selection_stores_pending_row() {
        let store = seeded_store();
        let sel = store.submit_selection("t1", "u1", "math", 1, 1500).unwrap();

        assert_eq!(sel.status, SelectionStatus::Pending);
        assert_eq!(store.list_selections_for_user("t1", "u1").unwrap(), vec![sel]);
    }

    #[test]
    fn resubmitting_rank_replaces_course() {
        let store = seeded_store();
        store.submit_selection("t1", "u1", "math", 1, 1500).unwrap();
        store.submit_selection("t1", "u1", "art", 1, 1600).unwrap();

        let rows = store.list_selections_for_user("t1", "u1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].course_id, "art");
        assert_eq!(rows[0].updated_at, 1600);
    }

    #[test]
    fn submit_rejects_rank_out_of_range() {
        let store = seeded_store();
        for rank in [0, 4] {
            let err = store.submit_selection("t1", "u1", "math", rank, 1500).unwrap_err();
            assert!(matches!(err, StateError::InvalidRank { max: 3, .. }));
        }
    }

    #[test]
    fn submit_rejects_unknown_term_and_course() {
        let store = seeded_store();
        assert!(matches!(
            store.submit_selection("nope", "u1", "math", 1, 1500),
            Err(StateError::NotFound(_))
        ));
        assert!(matches!(
            store.submit_selection("t1", "u1", "history", 1, 1500),
            Err(StateError::NotFound(_))
        ));
    }

    #[test]
    fn submit_respects_selection_window() {
        let store = seeded_store();
        assert!(matches!(
            store.submit_selection("t1", "u1", "math", 1, 999),
            Err(StateError::SelectionClosed { now: 999, opens_at: 1000, .. })
        ));
        assert!(matches!(
            store.submit_selection("t1", "u1", "math", 1, 2001),
            Err(StateError::SelectionClosed { closes_at: 2000, .. })
        ));
        assert!(store.submit_selection("t1", "u1", "math", 1, 2000).is_ok());
    }

    #[test]
    fn submit_rejects_inactive_term() {
        let store = seeded_store();
        let mut term = test_term("t1");
        term.is_active = false;
        store.put_term(&term).unwrap();

        assert!(matches!(
            store.submit_selection("t1", "u1", "math", 1, 1500),
            Err(StateError::TermInactive { .. })
        ));
    }

    #[test]
    fn remove_and_clear_selections() {
        let store = seeded_store();
        store.submit_selection("t1", "u1", "math", 1, 1500).unwrap();
        store.submit_selection("t1", "u1", "art", 2, 1500).unwrap();
        store.submit_selection("t1", "u2", "art", 1, 1500).unwrap();

        assert!(store.remove_selection("t1", "u1", 2).unwrap());
        assert!(!store.remove_selection("t1", "u1", 2).unwrap());

        assert_eq!(store.clear_selections("t1", "u1").unwrap(), 1);
        let left = store.list_selections("t1").unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].user_id, "u2");
    }

    #[test]
    fn ids_with_key_separators_are_rejected() {
        let store = seeded_store();

        assert!(matches!(
            store.put_term(&test_term("t1/fall")),
            Err(StateError::InvalidId { kind: "term", .. })
        ));
        assert!(matches!(
            store.put_course(&test_course("t1", "math/2", 1)),
            Err(StateError::InvalidId { kind: "course", .. })
        ));
        assert!(matches!(
            store.put_course(&test_course("t1", "", 1)),
            Err(StateError::InvalidId { kind: "course", .. })
        ));
        assert!(matches!(
            store.submit_selection("t1", "a:b", "math", 1, 1500),
            Err(StateError::InvalidId { kind: "user", .. })
        ));

        assert_eq!(store.list_terms().unwrap().len(), 1);
        assert_eq!(store.list_courses("t1").unwrap().len(), 2);
        assert!(store.list_selections("t1").unwrap().is_empty());
    }

    #[test]
    fn users_sharing_a_prefix_keep_separate_selections() {
        let store = seeded_store();
        store.submit_selection("t1", "a", "math", 1, 1500).unwrap();
        store.submit_selection("t1", "ab", "art", 1, 1500).unwrap();
        store.submit_selection("t1", "ab", "math", 2, 1500).unwrap();

        assert_eq!(store.list_selections_for_user("t1", "a").unwrap().len(), 1);
        assert_eq!(store.clear_selections("t1", "a").unwrap(), 1);

        let left = store.list_selections("t1").unwrap();
        assert_eq!(left.len(), 2);
        assert!(left.iter().all(|s| s.user_id == "ab"));
    }

    #[test]
    fn course_demand_counts_distinct_users() {
        let store = seeded_store();
        store.submit_selection("t1", "u1", "art", 1, 1500).unwrap();
        store.submit_selection("t1", "u2", "art", 1, 1500).unwrap();
        store.submit_selection("t1", "u2", "math", 2, 1500).unwrap();

        let demand = store.course_demand("t1").unwrap();
        let art = demand.iter().find(|d| d.course_id == "art").unwrap();
        let math = demand.iter().find(|d| d.course_id == "math").unwrap();

        assert_eq!(art.current_requests, 2);
        assert_eq!(art.seats_remaining, -1);
        assert_eq!(math.current_requests, 1);
        assert_eq!(math.seats_remaining, 1);
    }

    // ── Assignments ────────────────────────────────────────────────

    #[test]
    fn replace_assignments_relabels_selections() {
        let store = seeded_store();
        store.submit_selection("t1", "u1", "art", 1, 1500).unwrap();
        store.submit_selection("t1", "u1", "math", 2, 1500).unwrap();
        store.submit_selection("t1", "u2", "art", 1, 1500).unwrap();

        store
            .replace_assignments("t1", &[record("t1", "u1", "art", 1)])
            .unwrap();

        let rows = store.list_selections("t1").unwrap();
        let status = |user: &str, course: &str| {
            rows.iter()
                .find(|s| s.user_id == user && s.course_id == course)
                .unwrap()
                .status
        };
        assert_eq!(status("u1", "art"), SelectionStatus::Assigned);
        assert_eq!(status("u1", "math"), SelectionStatus::NotAssigned);
        assert_eq!(status("u2", "art"), SelectionStatus::NotAssigned);
    }

    #[test]
    fn replace_assignments_drops_prior_set() {
        let store = seeded_store();
        store.put_term(&test_term("t2")).unwrap();
        store
            .replace_assignments("t1", &[record("t1", "u1", "art", 1), record("t1", "u2", "math", 1)])
            .unwrap();
        store
            .replace_assignments("t2", &[record("t2", "u9", "x", 1)])
            .unwrap();

        store
            .replace_assignments("t1", &[record("t1", "u3", "math", 2)])
            .unwrap();

        let t1 = store.list_assignments("t1").unwrap();
        assert_eq!(t1, vec![record("t1", "u3", "math", 2)]);
        // t2 untouched
        assert_eq!(store.list_assignments("t2").unwrap().len(), 1);
    }

    #[test]
    fn replace_assignments_keeps_terms_sharing_a_prefix() {
        let store = TermStore::open_in_memory().unwrap();
        store.put_term(&test_term("2025")).unwrap();
        store.put_term(&test_term("20251")).unwrap();
        store.put_course(&test_course("2025", "x", 1)).unwrap();
        store.put_course(&test_course("20251", "math", 1)).unwrap();
        store
            .replace_assignments("20251", &[record("20251", "u1", "math", 1)])
            .unwrap();

        store.replace_assignments("2025", &[]).unwrap();

        let courses = store.list_courses("2025").unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, "x");
        assert_eq!(store.list_assignments("20251").unwrap().len(), 1);
    }

    #[test]
    fn replace_assignments_rejects_separator_in_ids() {
        let store = seeded_store();
        store
            .replace_assignments("t1", &[record("t1", "u1", "art", 1)])
            .unwrap();

        let err = store
            .replace_assignments("t1", &[record("t1", "a:b", "art", 1)])
            .unwrap_err();
        assert!(matches!(err, StateError::InvalidId { kind: "user", .. }));
        assert_eq!(store.list_assignments("t1").unwrap(), vec![record("t1", "u1", "art", 1)]);
    }

    #[test]
    fn replace_assignments_with_foreign_term_writes_nothing() {
        let store = seeded_store();
        store
            .replace_assignments("t1", &[record("t1", "u1", "art", 1)])
            .unwrap();

        let err = store
            .replace_assignments("t1", &[record("t1", "u2", "art", 1), record("t2", "u3", "x", 1)])
            .unwrap_err();
        assert!(matches!(err, StateError::Write(_)));
        assert_eq!(store.list_assignments("t1").unwrap(), vec![record("t1", "u1", "art", 1)]);
    }

    // ── Import ─────────────────────────────────────────────────────

    #[test]
    fn import_dataset_writes_everything() {
        let store = TermStore::open_in_memory().unwrap();
        let dataset = TermDataset {
            term: test_term("t1"),
            courses: vec![DatasetCourse {
                id: "math".to_string(),
                code: "MATH101".to_string(),
                name: String::new(),
                capacity: 1,
            }],
            selections: vec![
                DatasetSelection { user: "u1".to_string(), course: "math".to_string(), rank: 1 },
                DatasetSelection { user: "u2".to_string(), course: "math".to_string(), rank: 1 },
            ],
        };

        assert_eq!(store.import_dataset(&dataset).unwrap(), (1, 2));
        assert_eq!(store.list_selections("t1").unwrap().len(), 2);
    }

    #[test]
    fn import_rejects_selection_for_missing_course() {
        let store = TermStore::open_in_memory().unwrap();
        let dataset = TermDataset {
            term: test_term("t1"),
            courses: vec![DatasetCourse {
                id: "math".to_string(),
                code: "MATH101".to_string(),
                name: String::new(),
                capacity: 1,
            }],
            selections: vec![
                DatasetSelection { user: "u1".to_string(), course: "math".to_string(), rank: 1 },
                DatasetSelection { user: "u1".to_string(), course: "ghost".to_string(), rank: 2 },
            ],
        };

        assert!(matches!(store.import_dataset(&dataset), Err(StateError::NotFound(_))));

        // Nothing from the failed import is left behind.
        assert!(store.get_term("t1").unwrap().is_none());
        assert!(store.list_courses("t1").unwrap().is_empty());
        assert!(store.list_selections("t1").unwrap().is_empty());
    }

    #[test]
    fn import_accepts_course_stored_earlier() {
        let store = seeded_store();
        let dataset = TermDataset {
            term: test_term("t1"),
            courses: vec![],
            selections: vec![DatasetSelection {
                user: "u1".to_string(),
                course: "art".to_string(),
                rank: 1,
            }],
        };

        assert_eq!(store.import_dataset(&dataset).unwrap(), (0, 1));
        assert_eq!(store.list_selections("t1").unwrap()[0].course_id, "art");
    }

    #[test]
    fn import_rejects_separator_in_ids() {
        let store = TermStore::open_in_memory().unwrap();
        let dataset = TermDataset {
            term: test_term("2025/fall"),
            courses: vec![],
            selections: vec![],
        };

        assert!(matches!(
            store.import_dataset(&dataset),
            Err(StateError::InvalidId { kind: "term", .. })
        ));
        assert!(store.list_terms().unwrap().is_empty());
    }

    // ── Persistence (on-disk) ──────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let store = TermStore::open(&db_path).unwrap();
            store.put_term(&test_term("fall")).unwrap();
            store.put_course(&test_course("fall", "math", 3)).unwrap();
        }

        let store = TermStore::open(&db_path).unwrap();
        assert!(store.get_term("fall").unwrap().is_some());
        assert_eq!(store.list_courses("fall").unwrap().len(), 1);
    }

    // ── Edge cases ─────────────────────────────────────────────────

    #[test]
    fn empty_store_operations() {
        let store = TermStore::open_in_memory().unwrap();

        assert!(store.list_terms().unwrap().is_empty());
        assert!(store.list_courses("any").unwrap().is_empty());
        assert!(store.list_selections("any").unwrap().is_empty());
        assert!(store.list_assignments("any").unwrap().is_empty());
        assert!(store.course_demand("any").unwrap().is_empty());
        assert!(!store.remove_selection("any", "u", 1).unwrap());
        assert_eq!(store.clear_selections("any", "u").unwrap(), 0);
        store.replace_assignments("any", &[]).unwrap();
    }
}
