//! Processing order for one allocation pass.
//!
//! The order in which requesters are visited decides who wins the last
//! seats of a contested resource. Production runs shuffle the requester set
//! with a seeded ChaCha8 generator; tests pin a seed or a fixed order.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use seatgrid_core::RequesterId;

use crate::index::PreferenceIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOrder {
    /// Uniform random permutation determined entirely by the seed.
    Seeded(u64),
    /// Caller-chosen order. Unknown ids are skipped, repeats are visited
    /// once, and requesters left out are appended in ascending id order.
    Fixed(Vec<RequesterId>),
}

impl ProcessingOrder {
    /// A seeded order with a fresh seed from the thread RNG.
    /// The seed is logged so the run can be replayed.
    pub fn from_entropy() -> Self {
        let seed: u64 = rand::rng().random();
        info!(seed, "drew shuffle seed");
        ProcessingOrder::Seeded(seed)
    }

    pub fn seed(&self) -> Option<u64> {
        match self {
            ProcessingOrder::Seeded(seed) => Some(*seed),
            ProcessingOrder::Fixed(_) => None,
        }
    }

    /// Every requester of `index`, each exactly once, in visiting order.
    pub fn arrange(&self, index: &PreferenceIndex) -> Vec<RequesterId> {
        match self {
            ProcessingOrder::Seeded(seed) => {
                // Sorted input, so the permutation depends only on the seed.
                let mut order: Vec<RequesterId> = index.requesters().cloned().collect();
                let mut rng = ChaCha8Rng::seed_from_u64(*seed);
                order.shuffle(&mut rng);
                debug!(seed, requesters = order.len(), "requesters shuffled");
                order
            }
            ProcessingOrder::Fixed(requested) => {
                let mut seen: HashSet<&str> = HashSet::new();
                let mut order = Vec::with_capacity(index.requester_count());
                for id in requested {
                    if index.contains_requester(id) && seen.insert(id.as_str()) {
                        order.push(id.clone());
                    }
                }
                for id in index.requesters() {
                    if !seen.contains(id.as_str()) {
                        order.push(id.clone());
                    }
                }
                order
            }
        }
    }
}
