//! Canopy - selection and bulk mutation over hierarchical content trees
//!
//! This library provides the pieces needed to select items in a content
//! hierarchy (series, seasons, episodes, ...) and delete or move them in bulk
//! against a content store, reporting a per-item outcome.
//!
//! - [`tree`]: read-only traversal of a collection tree
//! - [`selection`]: selection set and mode as a pure reducer
//! - [`bulk`]: planning statistics and executing bulk deletes and moves
//! - [`store`]: the store contract used by the executor
//! - [`db`]: sled-backed local store

use thiserror::Error;

pub mod bulk;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod output;
pub mod selection;
pub mod store;
pub mod tree;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum CanopyError {
    /// Database error
    #[error("Database error: {0}")]
    DbError(#[from] db::DbError),
    /// Store call failed outside of a bulk batch
    #[error("Store error: {0}")]
    StoreError(#[from] store::StoreError),
    /// Move destination rejected before any call was made
    #[error("Move error: {0}")]
    MoveError(#[from] bulk::MoveError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Import or export file could not be parsed or written
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Some items of a bulk operation failed; details were already reported
    #[error("{failed} of {total} item(s) failed")]
    BulkFailed { failed: usize, total: usize },
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
