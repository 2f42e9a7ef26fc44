//! Persistence API contract
//!
//! The bulk engine talks to its backing store only through [`ContentStore`].
//! Every call succeeds or fails on its own; the engine never assumes a
//! cross-item transaction. Implementations enforce their own authorization.

use crate::tree::Tree;

pub mod error;

pub use error::StoreError;

/// Partial update for a single content item
///
/// `None` leaves a field untouched. For `parent_id`, `Some(None)` moves the
/// item to the root level of its collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub parent_id: Option<Option<String>>,
    pub order_index: Option<u32>,
    pub title: Option<String>,
}

impl ItemPatch {
    /// Patch that re-parents an item at a given sibling position
    #[must_use]
    pub const fn relocate(parent_id: Option<String>, order_index: u32) -> Self {
        Self {
            parent_id: Some(parent_id),
            order_index: Some(order_index),
            title: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent_id.is_none() && self.order_index.is_none() && self.title.is_none()
    }
}

/// Backing store for content trees
///
/// Implementations must be `Sync`: bulk operations dispatch calls from a
/// bounded worker pool.
pub trait ContentStore: Sync {
    /// Current snapshot of one collection
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the collection cannot be read; callers treat
    /// this as fatal for the view that requested it.
    fn fetch_tree(&self, collection_id: &str) -> Result<Tree, StoreError>;

    /// Delete a single item
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the item is already absent, or any
    /// other `StoreError` on failure.
    fn delete_item(&self, id: &str) -> Result<(), StoreError>;

    /// Apply a partial update to a single item
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the item is missing or the update fails.
    fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<(), StoreError>;
}

impl<S: ContentStore + ?Sized> ContentStore for &S {
    fn fetch_tree(&self, collection_id: &str) -> Result<Tree, StoreError> {
        (**self).fetch_tree(collection_id)
    }

    fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        (**self).delete_item(id)
    }

    fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<(), StoreError> {
        (**self).update_item(id, patch)
    }
}
