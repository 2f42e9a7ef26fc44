//! Per-call failures reported by a [`ContentStore`](super::ContentStore)

use thiserror::Error;

/// Failure of a single store call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The item or collection does not exist (already deleted counts here)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller may not touch this item
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The store refused the change (e.g. it would create a cycle)
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Temporary backend failure; the caller may retry later
    #[error("Transient failure: {0}")]
    Transient(String),
}

impl StoreError {
    /// Whether this error means the item is already gone
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<crate::db::DbError> for StoreError {
    fn from(err: crate::db::DbError) -> Self {
        match err {
            crate::db::DbError::CollectionNotFound(id) => Self::NotFound(id),
            crate::db::DbError::InvalidInput(msg) => Self::Rejected(msg),
            other => Self::Transient(other.to_string()),
        }
    }
}
