//! Testing utilities for canopy
//!
//! Fixture trees, a `TestDb` wrapper for temporary sled databases and a
//! `ScriptedStore` whose per-item failures can be set up ahead of time.
//!
//! Only available when compiled with `cfg(test)`.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tempfile::TempDir;

use crate::db::Database;
use crate::store::{ContentStore, ItemPatch, StoreError};
use crate::tree::{ContentRecord, Tree, build_tree};

/// Record in collection `c1` with the id doubling as title
pub fn record(id: &str, parent: Option<&str>) -> ContentRecord {
    ContentRecord::new(id, parent.map(String::from), "c1", "episode", id)
}

fn titled(id: &str, parent: Option<&str>, title: &str, order: u32) -> ContentRecord {
    ContentRecord::new(id, parent.map(String::from), "c1", "episode", title).with_order(order)
}

pub fn ids(values: &[&str]) -> HashSet<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// ```text
/// Whoniverse
/// ├── series
/// │   ├── season1
/// │   │   ├── ep1
/// │   │   └── ep2
/// │   └── season2
/// │       └── ep3
/// └── film
/// ```
pub fn sample_tree() -> Tree {
    build_tree(
        "c1",
        "Whoniverse",
        vec![
            titled("series", None, "Series", 0),
            titled("season1", Some("series"), "Season 1", 0),
            titled("ep1", Some("season1"), "Episode 1", 0),
            titled("ep2", Some("season1"), "Episode 2", 1),
            titled("season2", Some("series"), "Season 2", 1),
            titled("ep3", Some("season2"), "Episode 3", 0),
            titled("film", None, "Film", 1),
        ],
    )
}

/// `root -> [folder -> [item1, item2]]`
pub fn folder_tree() -> Tree {
    build_tree(
        "c1",
        "Universe",
        vec![
            titled("root", None, "Root", 0),
            titled("folder", Some("root"), "Folder", 0),
            titled("item1", Some("folder"), "Item 1", 0),
            titled("item2", Some("folder"), "Item 2", 1),
        ],
    )
}

/// `a -> b -> c`
pub fn chain_tree() -> Tree {
    build_tree(
        "c1",
        "Universe",
        vec![record("a", None), record("b", Some("a")), record("c", Some("b"))],
    )
}

/// In-memory store with scripted per-item failures
///
/// Items listed in `present` exist; deleting anything else yields
/// `NotFound`. Failures registered with [`ScriptedStore::fail`] win over
/// everything else.
#[derive(Default)]
pub struct ScriptedStore {
    tree: Option<Tree>,
    present: Mutex<HashSet<String>>,
    failures: HashMap<String, StoreError>,
    calls: Mutex<Vec<String>>,
    patches: Mutex<Vec<(String, ItemPatch)>>,
}

impl ScriptedStore {
    pub fn with_tree(tree: &Tree) -> Self {
        Self {
            present: Mutex::new(tree.iter().map(|n| n.id.clone()).collect()),
            tree: Some(tree.clone()),
            ..Self::default()
        }
    }

    /// Store where nothing exists
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fail(mut self, id: &str, error: StoreError) -> Self {
        self.failures.insert(id.to_string(), error);
        self
    }

    /// Ids in the order calls reached the store
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn patches(&self) -> Vec<(String, ItemPatch)> {
        self.patches.lock().unwrap().clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.present.lock().unwrap().contains(id)
    }
}

impl ContentStore for ScriptedStore {
    fn fetch_tree(&self, collection_id: &str) -> Result<Tree, StoreError> {
        self.tree
            .clone()
            .filter(|t| t.collection_id == collection_id)
            .ok_or_else(|| StoreError::NotFound(collection_id.to_string()))
    }

    fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(id.to_string());
        if let Some(error) = self.failures.get(id) {
            return Err(error.clone());
        }
        if self.present.lock().unwrap().remove(id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.to_string()))
        }
    }

    fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(id.to_string());
        if let Some(error) = self.failures.get(id) {
            return Err(error.clone());
        }
        if !self.present.lock().unwrap().contains(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.patches.lock().unwrap().push((id.to_string(), patch.clone()));
        Ok(())
    }
}

/// Temporary sled database removed when dropped
pub struct TestDb {
    _dir: TempDir,
    db: Database,
}

impl TestDb {
    /// # Panics
    /// Panics if the temporary directory or database cannot be created.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = Database::open(dir.path().join("db")).expect("Failed to open test database");
        Self { _dir: dir, db }
    }

    /// Database pre-loaded with [`sample_tree`] as collection `c1`
    pub fn with_sample() -> Self {
        let test_db = Self::new();
        test_db
            .db
            .insert_collection("c1", "Whoniverse")
            .expect("Failed to insert collection");
        for record in sample_tree().records() {
            test_db.db.insert_item(&record).expect("Failed to insert item");
        }
        test_db
    }

    pub const fn db(&self) -> &Database {
        &self.db
    }
}
