//! Database wrapper module for canopy
//!
//! Provides the local [`ContentStore`] implementation using sled as the
//! embedded database backend.
//!
//! Uses multiple sled trees for efficient indexing:
//! - `items`: item id -> `ContentRecord`
//! - `collections`: collection id -> collection name
//! - `members`: `collection \0 item` edges, one key per item
//! - `children`: `parent \0 child` edges, one key per non-root item
//!
//! Deleting an item cascades to its whole subtree, the way the hosted backend
//! does. A later delete for one of those descendants reports `NotFound`.

use sled::{Db, Tree as SledTree};
use std::collections::HashSet;
use std::path::Path;

use crate::store::{ContentStore, ItemPatch, StoreError};
use crate::tree::{ContentRecord, Tree, build_tree};

pub mod error;
pub mod types;

pub use error::DbError;
pub use types::{IndexKey, check_id, decode_record, encode_record};

/// Database wrapper that encapsulates all database operations
pub struct Database {
    db: Db,
    items: SledTree,
    collections: SledTree,
    members: SledTree,
    children: SledTree,
}

impl Database {
    /// Opens or creates a database at the specified path
    ///
    /// # Examples
    /// ```no_run
    /// use canopy::db::Database;
    /// let db = Database::open("my_db").unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be opened or if the internal trees cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let db = sled::open(path)?;
        let items = db.open_tree("items")?;
        let collections = db.open_tree("collections")?;
        let members = db.open_tree("members")?;
        let children = db.open_tree("children")?;
        Ok(Self {
            db,
            items,
            collections,
            members,
            children,
        })
    }

    /// Create or rename a collection
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidInput` for an id [`check_id`] rejects, or
    /// `DbError` if the write fails.
    pub fn insert_collection(&self, id: &str, name: &str) -> Result<(), DbError> {
        check_id(id)?;
        self.collections.insert(id.as_bytes(), name.as_bytes())?;
        Ok(())
    }

    /// Name of a collection, `None` if it does not exist
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the read fails or the stored name is not UTF-8.
    pub fn collection_name(&self, id: &str) -> Result<Option<String>, DbError> {
        self.collections
            .get(id.as_bytes())?
            .map(|value| {
                String::from_utf8(value.to_vec())
                    .map_err(|_| DbError::SerializeError("Invalid UTF-8 in collection name".into()))
            })
            .transpose()
    }

    /// All collections as `(id, name)` pairs, sorted by id
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration fails or a key is not UTF-8.
    pub fn list_collections(&self) -> Result<Vec<(String, String)>, DbError> {
        let mut collections = Vec::new();
        for result in &self.collections {
            let (key, value) = result?;
            let to_string = |bytes: &[u8]| {
                String::from_utf8(bytes.to_vec())
                    .map_err(|_| DbError::SerializeError("Invalid UTF-8 in collection".into()))
            };
            collections.push((to_string(key.as_ref())?, to_string(value.as_ref())?));
        }
        Ok(collections)
    }

    /// Insert or replace a content item
    ///
    /// # Errors
    ///
    /// Returns `DbError::CollectionNotFound` if the record's collection does
    /// not exist, `DbError::InvalidInput` if its parent is missing, lives in
    /// another collection or would create a cycle, or if an id contains a
    /// NUL byte, or any storage error.
    pub fn insert_item(&self, record: &ContentRecord) -> Result<(), DbError> {
        check_id(&record.id)?;
        check_id(&record.collection_id)?;
        if !self.collections.contains_key(record.collection_id.as_bytes())? {
            return Err(DbError::CollectionNotFound(record.collection_id.clone()));
        }
        if let Some(parent_id) = &record.parent_id {
            self.check_parent(&record.id, &record.collection_id, parent_id)?;
        }

        if let Some(old) = self.get_item(&record.id)? {
            self.remove_from_indexes(&old)?;
        }
        self.items.insert(record.id.as_bytes(), encode_record(record)?)?;
        self.add_to_indexes(record)?;
        Ok(())
    }

    /// Get a single item
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the read fails or the record cannot be decoded.
    pub fn get_item(&self, id: &str) -> Result<Option<ContentRecord>, DbError> {
        self.items
            .get(id.as_bytes())?
            .map(|value| decode_record(&value))
            .transpose()
    }

    /// All items of a collection, in no particular order
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration or decoding fails.
    pub fn items_in_collection(&self, collection_id: &str) -> Result<Vec<ContentRecord>, DbError> {
        let mut records = Vec::new();
        for result in self.members.scan_prefix(IndexKey::prefix(collection_id)) {
            let (key, _) = result?;
            let id = IndexKey::member_from_bytes(collection_id, &key)?;
            // An edge can outlive its item for a moment during a concurrent delete
            if let Some(record) = self.get_item(&id)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Ids of the immediate children of an item
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration fails or a key is malformed.
    pub fn children_of(&self, id: &str) -> Result<Vec<String>, DbError> {
        self.children
            .scan_prefix(IndexKey::prefix(id))
            .map(|result| {
                let (key, _) = result?;
                IndexKey::member_from_bytes(id, &key)
            })
            .collect()
    }

    /// Ids of every item below `id`, in no particular order
    ///
    /// # Errors
    ///
    /// Returns `DbError` if reading the child index fails.
    pub fn descendant_ids(&self, id: &str) -> Result<Vec<String>, DbError> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = self.children_of(id)?;
        while let Some(next) = queue.pop() {
            if seen.insert(next.clone()) {
                queue.extend(self.children_of(&next)?);
                found.push(next);
            }
        }
        Ok(found)
    }

    /// Remove an item together with its whole subtree
    ///
    /// # Returns
    /// `true` if the item existed
    ///
    /// # Errors
    ///
    /// Returns `DbError` if reading or writing fails.
    pub fn remove_item(&self, id: &str) -> Result<bool, DbError> {
        let Some(record) = self.get_item(id)? else {
            return Ok(false);
        };

        for descendant in self.descendant_ids(id)? {
            if let Some(value) = self.items.remove(descendant.as_bytes())? {
                self.remove_from_indexes(&decode_record(&value)?)?;
            }
        }
        // Another worker may have removed this item while we cascaded
        let existed = self.items.remove(id.as_bytes())?.is_some();
        self.remove_from_indexes(&record)?;
        Ok(existed)
    }

    /// Apply a partial update
    ///
    /// # Returns
    /// `false` if the item does not exist
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidInput` if the new parent is rejected, or any
    /// storage error.
    pub fn update_record(&self, id: &str, patch: &ItemPatch) -> Result<bool, DbError> {
        let Some(mut record) = self.get_item(id)? else {
            return Ok(false);
        };
        if let Some(parent_id) = &patch.parent_id {
            record.parent_id.clone_from(parent_id);
        }
        if let Some(order_index) = patch.order_index {
            record.order_index = order_index;
        }
        if let Some(title) = &patch.title {
            record.title.clone_from(title);
        }
        self.insert_item(&record)?;
        Ok(true)
    }

    /// Get the number of items in the database
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Check if an item exists
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the read fails.
    pub fn contains(&self, id: &str) -> Result<bool, DbError> {
        Ok(self.items.contains_key(id.as_bytes())?)
    }

    /// Flush all pending writes to disk
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the flush operation fails.
    pub fn flush(&self) -> Result<(), DbError> {
        self.db.flush()?;
        Ok(())
    }

    /// Clear all entries from the database
    ///
    /// # Warning
    /// This operation is irreversible!
    ///
    /// # Errors
    ///
    /// Returns `DbError` if clearing any tree fails.
    pub fn clear(&self) -> Result<(), DbError> {
        self.items.clear()?;
        self.collections.clear()?;
        self.members.clear()?;
        self.children.clear()?;
        Ok(())
    }

    // Private helper methods for managing the indexes

    fn check_parent(&self, id: &str, collection_id: &str, parent_id: &str) -> Result<(), DbError> {
        if parent_id == id {
            return Err(DbError::InvalidInput(format!("{id} cannot be its own parent")));
        }
        let parent = self
            .get_item(parent_id)?
            .ok_or_else(|| DbError::InvalidInput(format!("Parent not found: {parent_id}")))?;
        if parent.collection_id != collection_id {
            return Err(DbError::InvalidInput(format!(
                "Parent {parent_id} belongs to another collection"
            )));
        }
        if self.descendant_ids(id)?.iter().any(|d| d == parent_id) {
            return Err(DbError::InvalidInput(format!(
                "Moving {id} under {parent_id} would create a cycle"
            )));
        }
        Ok(())
    }

    fn add_to_indexes(&self, record: &ContentRecord) -> Result<(), DbError> {
        self.members.insert(
            IndexKey::new(&record.collection_id, &record.id).to_bytes(),
            Vec::new(),
        )?;
        if let Some(parent_id) = &record.parent_id {
            self.children
                .insert(IndexKey::new(parent_id, &record.id).to_bytes(), Vec::new())?;
        }
        Ok(())
    }

    fn remove_from_indexes(&self, record: &ContentRecord) -> Result<(), DbError> {
        self.members
            .remove(IndexKey::new(&record.collection_id, &record.id).to_bytes())?;
        if let Some(parent_id) = &record.parent_id {
            self.children
                .remove(IndexKey::new(parent_id, &record.id).to_bytes())?;
        }
        Ok(())
    }
}

impl ContentStore for Database {
    fn fetch_tree(&self, collection_id: &str) -> Result<Tree, StoreError> {
        let name = self
            .collection_name(collection_id)?
            .ok_or_else(|| StoreError::NotFound(collection_id.to_string()))?;
        let records = self.items_in_collection(collection_id)?;
        Ok(build_tree(collection_id, name, records))
    }

    fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        if self.remove_item(id)? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.to_string()))
        }
    }

    fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<(), StoreError> {
        if self.update_record(id, patch)? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.to_string()))
        }
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        // Best-effort flush on drop. Errors are ignored since we can't
        // propagate them from Drop. Callers should explicitly flush()
        // if they need guaranteed durability.
        let _ = self.db.flush();
    }
}
