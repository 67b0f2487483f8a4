//! Operational transform engine for Vellum documents.
//!
//! # Contract
//!
//! For two operations `a` and `b` generated against the same base document
//! `S`, `transform_pair(a, b, S)` yields `(a', b')` such that
//!
//! ```text
//! apply(apply(S, a), b') == apply(apply(S, b), a')
//! ```
//!
//! `a` carries priority: ties at identical positions resolve in `a`'s
//! favor. The server rebases an incoming client op against already-applied
//! history with [`transform_single`], where the prior (applied) op has
//! priority.
//!
//! # Op context
//!
//! Mapping a position through a concurrent `merge_block` requires the
//! length of the text the position lands after — state from the merge's
//! base document that the operation itself does not carry. The party that
//! applies an operation has that state, so it captures an [`OpContext`]
//! alongside the op; history buffers and pending-op queues store the pair.
//! `transform_pair` captures both contexts itself from the shared base.
//!
//! # Killed operations
//!
//! A transform can consume an operation entirely (its target was deleted
//! by the other side). Killed operations degrade to forms `apply` already
//! treats as no-ops — an empty insert, a collapsed delete, an index pushed
//! out of range — so downstream code never needs a special case.

mod context;
mod primitives;
mod transform;

pub use context::OpContext;
pub use primitives::{
    pos_vs_delete, pos_vs_delete_block, pos_vs_insert_block, pos_vs_insert_text, pos_vs_merge,
    pos_vs_split,
};
pub use transform::{transform_pair, transform_single, DEAD_INDEX};
