//! Preference indexing.
//!
//! Normalizes raw preference rows into two lookups:
//! - requester → choices, ascending by rank
//! - resource → rank → requesters, in input order

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use seatgrid_core::{PreferenceRecord, Rank, RequesterId, ResourceId};

/// One entry of a requester's preference list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedChoice {
    pub resource_id: ResourceId,
    pub rank: Rank,
}

#[derive(Debug, Clone, Default)]
pub struct PreferenceIndex {
    by_requester: BTreeMap<RequesterId, Vec<RankedChoice>>,
    by_resource: BTreeMap<ResourceId, BTreeMap<Rank, Vec<RequesterId>>>,
    record_count: usize,
    duplicates_dropped: usize,
}

impl PreferenceIndex {
    /// Index `records`. Row order does not matter except among duplicates:
    /// when a requester ranks the same resource twice, the first row wins.
    pub fn build(records: &[PreferenceRecord]) -> Self {
        let mut index = Self::default();
        let mut seen: HashSet<(&str, &str)> = HashSet::new();

        for rec in records {
            if !seen.insert((rec.requester_id.as_str(), rec.resource_id.as_str())) {
                warn!(
                    requester = %rec.requester_id,
                    resource = %rec.resource_id,
                    rank = rec.rank,
                    "duplicate preference dropped"
                );
                index.duplicates_dropped += 1;
                continue;
            }

            index
                .by_requester
                .entry(rec.requester_id.clone())
                .or_default()
                .push(RankedChoice {
                    resource_id: rec.resource_id.clone(),
                    rank: rec.rank,
                });
            index
                .by_resource
                .entry(rec.resource_id.clone())
                .or_default()
                .entry(rec.rank)
                .or_default()
                .push(rec.requester_id.clone());
            index.record_count += 1;
        }

        // Stable, so equal ranks keep input order.
        for choices in index.by_requester.values_mut() {
            choices.sort_by_key(|c| c.rank);
        }

        debug!(
            requesters = index.by_requester.len(),
            resources = index.by_resource.len(),
            records = index.record_count,
            "preferences indexed"
        );
        index
    }

    /// Choices of one requester, most preferred first. Empty if unknown.
    pub fn choices(&self, requester_id: &str) -> &[RankedChoice] {
        self.by_requester
            .get(requester_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct requesters in ascending id order.
    pub fn requesters(&self) -> impl Iterator<Item = &RequesterId> {
        self.by_requester.keys()
    }

    pub fn contains_requester(&self, requester_id: &str) -> bool {
        self.by_requester.contains_key(requester_id)
    }

    /// Requesters who gave `resource_id` the given rank, in input order.
    pub fn requesters_at(&self, resource_id: &str, rank: Rank) -> &[RequesterId] {
        self.by_resource
            .get(resource_id)
            .and_then(|ranks| ranks.get(&rank))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resources named in at least one preference.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceId> {
        self.by_resource.keys()
    }

    pub fn requester_count(&self) -> usize {
        self.by_requester.len()
    }

    /// Rows kept after dropping duplicates.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    pub fn is_empty(&self) -> bool {
        self.by_requester.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(req: &str, res: &str, rank: Rank) -> PreferenceRecord {
        PreferenceRecord::new(req, res, rank)
    }

    #[test]
    fn choices_sorted_by_rank() {
        let records = vec![rec("x", "C", 3), rec("x", "A", 1), rec("x", "B", 2)];
        let index = PreferenceIndex::build(&records);

        let ids: Vec<&str> = index.choices("x").iter().map(|c| c.resource_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn resource_lookup_groups_by_rank() {
        let records = vec![rec("x", "A", 1), rec("y", "A", 2), rec("z", "A", 1)];
        let index = PreferenceIndex::build(&records);

        assert_eq!(index.requesters_at("A", 1), ["x".to_string(), "z".to_string()]);
        assert_eq!(index.requesters_at("A", 2), ["y".to_string()]);
        assert!(index.requesters_at("A", 3).is_empty());
        assert!(index.requesters_at("B", 1).is_empty());
    }

    #[test]
    fn requesters_are_distinct_and_ordered() {
        let records = vec![rec("m", "A", 1), rec("b", "A", 1), rec("m", "B", 2)];
        let index = PreferenceIndex::build(&records);

        let ids: Vec<&str> = index.requesters().map(String::as_str).collect();
        assert_eq!(ids, vec!["b", "m"]);
        assert_eq!(index.requester_count(), 2);
    }

    #[test]
    fn first_duplicate_wins() {
        let records = vec![rec("x", "A", 2), rec("x", "B", 1), rec("x", "A", 1)];
        let index = PreferenceIndex::build(&records);

        assert_eq!(index.duplicates_dropped(), 1);
        assert_eq!(index.record_count(), 2);
        assert_eq!(
            index.choices("x"),
            [
                RankedChoice { resource_id: "B".to_string(), rank: 1 },
                RankedChoice { resource_id: "A".to_string(), rank: 2 },
            ]
        );
    }

    #[test]
    fn empty_input_is_empty_index() {
        let index = PreferenceIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.choices("anyone").is_empty());
    }
}
