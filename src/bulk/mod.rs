//! Hierarchical bulk operations
//!
//! - `plan`: affected-set statistics for a confirmation prompt
//! - `execute`: cascading delete with bounded fan-out and partial failures
//! - `relocate`: move selected items under a new parent
//! - `result`: per-batch aggregate handed back to the caller
//!
//! Typical flow: build a [`SelectionState`](crate::selection::SelectionState),
//! call [`plan`] to show what will be affected, then [`execute_delete`] and
//! feed the result to
//! [`SelectionState::apply_outcome`](crate::selection::SelectionState::apply_outcome)
//! and [`Tree::without`](crate::tree::Tree::without).

mod execute;
mod plan;
mod relocate;
mod result;

pub use execute::{CancelToken, DEFAULT_CONCURRENCY, ExecuteOptions, execute_delete};
pub use plan::{Statistics, affected_ids, plan};
pub use relocate::{Destination, MoveError, execute_move, validate_move_destination};
pub use result::{BatchOutcome, BulkOperationResult, ItemFailure};
