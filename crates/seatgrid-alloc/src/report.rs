//! Run statistics and human-readable report formatting.

use std::collections::BTreeMap;

use serde::Serialize;

use seatgrid_core::{AssignmentSet, Rank};

use crate::index::PreferenceIndex;
use crate::scorer::{MAX_SATISFACTION, satisfaction_score};

/// Read-only summary of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStatistics {
    /// Distinct requesters with at least one preference.
    pub total_requesters: usize,
    pub assigned: usize,
    pub unassigned: usize,
    /// Assignment count per assigned rank.
    pub by_rank: BTreeMap<Rank, usize>,
    /// Achieved score over the score if every assignment were a first choice,
    /// in percent. 0 when nothing was assigned.
    pub satisfaction_percent: f64,
}

impl RunStatistics {
    pub fn compute(index: &PreferenceIndex, assignments: &AssignmentSet) -> Self {
        let total_requesters = index.requester_count();
        let assigned = assignments.len();

        let mut by_rank: BTreeMap<Rank, usize> = BTreeMap::new();
        let mut total_score: u64 = 0;
        for a in assignments.iter() {
            *by_rank.entry(a.rank).or_insert(0) += 1;
            total_score += u64::from(satisfaction_score(a.rank));
        }

        let max_score = assigned as u64 * u64::from(MAX_SATISFACTION);
        let satisfaction_percent = if max_score > 0 {
            total_score as f64 / max_score as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_requesters,
            assigned,
            unassigned: total_requesters.saturating_sub(assigned),
            by_rank,
            satisfaction_percent,
        }
    }

    pub fn count_at(&self, rank: Rank) -> usize {
        self.by_rank.get(&rank).copied().unwrap_or(0)
    }

    /// Percent of assignments made at `rank`. 0 when nothing was assigned.
    pub fn rank_share(&self, rank: Rank) -> f64 {
        if self.assigned == 0 {
            return 0.0;
        }
        self.count_at(rank) as f64 / self.assigned as f64 * 100.0
    }
}

fn choice_label(rank: Rank) -> String {
    match rank {
        1 => "1st Choice".to_string(),
        2 => "2nd Choice".to_string(),
        3 => "3rd Choice".to_string(),
        n => format!("Rank {n}"),
    }
}

pub fn format_report(stats: &RunStatistics) -> String {
    let mut out = String::new();

    out.push_str("\n══════════════════════════════════════════\n");
    out.push_str("  OPTIMIZATION RESULTS\n");
    out.push_str("══════════════════════════════════════════\n");
    out.push_str(&format!("Total Students:        {}\n", stats.total_requesters));
    out.push_str(&format!("Students Assigned:     {}\n", stats.assigned));
    out.push_str(&format!("Students Not Assigned: {}\n\n", stats.unassigned));

    out.push_str("Assignments by Preference:\n");
    let extra = stats.by_rank.keys().copied().filter(|r| !(1..=3).contains(r));
    for rank in (1..=3).chain(extra) {
        let count = stats.count_at(rank);
        if stats.assigned > 0 {
            out.push_str(&format!(
                "  {}: {} ({:.1}%)\n",
                choice_label(rank),
                count,
                stats.rank_share(rank)
            ));
        } else {
            out.push_str(&format!("  {}: {}\n", choice_label(rank), count));
        }
    }

    out.push_str(&format!(
        "\nOverall Satisfaction Score: {:.1}%\n",
        stats.satisfaction_percent
    ));
    out.push_str("══════════════════════════════════════════\n");
    out
}
