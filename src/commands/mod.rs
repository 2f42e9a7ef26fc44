//! Command implementations
//!
//! Each command is a module with functions that take parsed CLI args and run
//! the operation against a store. Bulk commands work with any
//! [`ContentStore`](crate::store::ContentStore); the rest need the local
//! database.

pub mod bulk;
pub mod collections;
pub mod item;
pub mod transfer;
pub mod tree;

// Re-export entry points for convenience
pub use bulk::{delete, plan, relocate};
pub use collections::execute as collections;
pub use item::{NewItem, execute as add, rename};
pub use transfer::{export, import};
pub use tree::{context, execute as tree};
