//! seatgrid-state — embedded term store for SeatGrid.
//!
//! Backed by [redb](https://docs.rs/redb), provides persistent and in-memory
//! storage for terms, courses, student selections, and assignment sets.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns.
//! Keys are prefixed with the term id (`{term}/{course}`,
//! `{term}/{user}:{rank}`) so everything belonging to one term is found
//! with a prefix scan.
//!
//! The `TermStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`).
//! Replacing a term's assignment set happens in a single write transaction.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::TermStore;
pub use types::*;
