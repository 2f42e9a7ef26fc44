//! Import and export of whole collections as JSON

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::db::{Database, check_id};
use crate::store::ContentStore;
use crate::tree::ContentRecord;
use crate::CanopyError;

type Result<T> = std::result::Result<T, CanopyError>;

/// On-disk form of a collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionSnapshot {
    pub collection_id: String,
    pub collection_name: String,
    /// Items in pre-order, so parents always precede their children
    pub items: Vec<ContentRecord>,
}

/// Snapshot of a collection as stored
///
/// # Errors
/// Returns an error if the collection cannot be fetched.
pub fn snapshot<S>(store: &S, collection: &str) -> Result<CollectionSnapshot>
where
    S: ContentStore + ?Sized,
{
    let tree = store.fetch_tree(collection)?;
    Ok(CollectionSnapshot {
        items: tree.records(),
        collection_id: tree.collection_id,
        collection_name: tree.collection_name,
    })
}

/// Execute the export command
///
/// # Errors
/// Returns an error if the collection cannot be fetched or the output cannot
/// be written.
pub fn export<S>(store: &S, collection: &str, output: Option<&Path>, quiet: bool) -> Result<()>
where
    S: ContentStore + ?Sized,
{
    let snapshot = snapshot(store, collection)?;
    let json = serde_json::to_string_pretty(&snapshot)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            if !quiet {
                println!(
                    "Exported {} item(s) of {} to {}",
                    snapshot.items.len(),
                    snapshot.collection_name,
                    path.display()
                );
            }
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Check a snapshot against the database and order it parents first
///
/// Every parent must be another item of the snapshot or an item of the same
/// collection already stored. Nothing is written here, so a rejected snapshot
/// leaves the database untouched.
///
/// # Errors
/// Returns `CanopyError::InvalidInput` for foreign or duplicate items, unknown
/// parents, parent cycles, and (unless `replace`) items that already exist.
/// Ids the database cannot store fail with `DbError::InvalidInput`.
pub fn prepare_import(
    db: &Database,
    snapshot: &CollectionSnapshot,
    replace: bool,
) -> Result<Vec<ContentRecord>> {
    check_id(&snapshot.collection_id)?;
    let mut ids = HashSet::new();
    for record in &snapshot.items {
        check_id(&record.id)?;
        if record.collection_id != snapshot.collection_id {
            return Err(CanopyError::InvalidInput(format!(
                "Item '{}' belongs to collection '{}'",
                record.id, record.collection_id
            )));
        }
        if !ids.insert(record.id.as_str()) {
            return Err(CanopyError::InvalidInput(format!(
                "Item '{}' appears more than once",
                record.id
            )));
        }
        if !replace && db.contains(&record.id)? {
            return Err(CanopyError::InvalidInput(format!(
                "Item '{}' already exists (use --replace to overwrite)",
                record.id
            )));
        }
    }

    let mut by_parent: HashMap<&str, Vec<&ContentRecord>> = HashMap::new();
    let mut pending: Vec<&ContentRecord> = Vec::new();
    for record in &snapshot.items {
        match record.parent_id.as_deref() {
            Some(parent) if ids.contains(parent) => {
                by_parent.entry(parent).or_default().push(record);
            }
            Some(parent) => {
                let stored = db.get_item(parent)?.ok_or_else(|| {
                    CanopyError::InvalidInput(format!(
                        "Parent '{parent}' of item '{}' not found",
                        record.id
                    ))
                })?;
                if stored.collection_id != snapshot.collection_id {
                    return Err(CanopyError::InvalidInput(format!(
                        "Parent '{parent}' of item '{}' belongs to another collection",
                        record.id
                    )));
                }
                pending.push(record);
            }
            None => pending.push(record),
        }
    }

    let mut ordered = Vec::with_capacity(snapshot.items.len());
    pending.reverse();
    while let Some(record) = pending.pop() {
        ordered.push(record.clone());
        if let Some(children) = by_parent.remove(record.id.as_str()) {
            pending.extend(children.into_iter().rev());
        }
    }

    // Whatever is left only hangs off itself
    if let Some(stuck) = by_parent.values().flatten().next() {
        return Err(CanopyError::InvalidInput(format!(
            "Item '{}' is part of a parent cycle",
            stuck.id
        )));
    }
    Ok(ordered)
}

/// Write a snapshot into the database
///
/// The snapshot is validated by [`prepare_import`] first and then inserted
/// parents first, whatever order the file lists the items in.
///
/// # Returns
/// Number of items written
///
/// # Errors
/// Returns an error if the snapshot is rejected or a write fails.
pub fn import_snapshot(db: &Database, snapshot: &CollectionSnapshot, replace: bool) -> Result<usize> {
    let records = prepare_import(db, snapshot, replace)?;

    db.insert_collection(&snapshot.collection_id, &snapshot.collection_name)?;
    for record in &records {
        db.insert_item(record)?;
    }
    db.flush()?;
    tracing::info!(
        collection = %snapshot.collection_id,
        items = records.len(),
        "collection imported"
    );
    Ok(records.len())
}

/// Execute the import command
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or the import fails.
pub fn import(db: &Database, file: &Path, replace: bool, quiet: bool) -> Result<()> {
    let content = fs::read_to_string(file).map_err(|e| {
        CanopyError::InvalidInput(format!("Failed to read {}: {e}", file.display()))
    })?;
    let snapshot: CollectionSnapshot = serde_json::from_str(&content)?;
    let count = import_snapshot(db, &snapshot, replace)?;
    if !quiet {
        println!("Imported {count} item(s) into {}", snapshot.collection_name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestDb;

    #[test]
    fn test_export_then_import_into_fresh_database() {
        let source = TestDb::with_sample();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("whoniverse.json");
        export(source.db(), "c1", Some(&path), true).unwrap();

        let target = TestDb::new();
        import(target.db(), &path, false, true).unwrap();
        let tree = target.db().fetch_tree("c1").unwrap();
        assert_eq!(tree, source.db().fetch_tree("c1").unwrap());
    }

    #[test]
    fn test_snapshot_lists_parents_first() {
        let test_db = TestDb::with_sample();
        let snapshot = snapshot(test_db.db(), "c1").unwrap();
        let position = |id: &str| snapshot.items.iter().position(|r| r.id == id).unwrap();
        assert!(position("series") < position("season1"));
        assert!(position("season1") < position("ep2"));
    }

    #[test]
    fn test_import_conflict_without_replace() {
        let test_db = TestDb::with_sample();
        let snapshot = snapshot(test_db.db(), "c1").unwrap();
        let err = import_snapshot(test_db.db(), &snapshot, false).unwrap_err();
        assert!(matches!(err, CanopyError::InvalidInput(msg) if msg.contains("already exists")));
        assert_eq!(import_snapshot(test_db.db(), &snapshot, true).unwrap(), 7);
        assert_eq!(test_db.db().count(), 7);
    }

    #[test]
    fn test_import_rejects_foreign_items() {
        let test_db = TestDb::new();
        let snapshot = CollectionSnapshot {
            collection_id: "c1".into(),
            collection_name: "One".into(),
            items: vec![ContentRecord::new("a", None, "c2", "film", "A")],
        };
        assert!(import_snapshot(test_db.db(), &snapshot, false).is_err());
        assert_eq!(test_db.db().count(), 0);
    }

    fn one(items: Vec<ContentRecord>) -> CollectionSnapshot {
        CollectionSnapshot {
            collection_id: "c1".into(),
            collection_name: "One".into(),
            items,
        }
    }

    #[test]
    fn test_import_children_listed_before_parents() {
        let test_db = TestDb::new();
        let snapshot = one(vec![
            ContentRecord::new("leaf", Some("mid".into()), "c1", "episode", "Leaf"),
            ContentRecord::new("mid", Some("top".into()), "c1", "season", "Mid"),
            ContentRecord::new("top", None, "c1", "series", "Top"),
        ]);
        assert_eq!(import_snapshot(test_db.db(), &snapshot, false).unwrap(), 3);

        let tree = test_db.db().fetch_tree("c1").unwrap();
        let ids: Vec<_> = tree.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["top", "mid", "leaf"]);
    }

    #[test]
    fn test_rejected_import_writes_nothing() {
        let test_db = TestDb::new();
        let snapshot = one(vec![
            ContentRecord::new("top", None, "c1", "series", "Top"),
            ContentRecord::new("leaf", Some("ghost".into()), "c1", "episode", "Leaf"),
        ]);
        let err = import_snapshot(test_db.db(), &snapshot, false).unwrap_err();
        assert!(matches!(err, CanopyError::InvalidInput(msg) if msg.contains("ghost")));
        assert_eq!(test_db.db().count(), 0);
        assert!(test_db.db().list_collections().unwrap().is_empty());
    }

    #[test]
    fn test_import_rejects_parent_cycles_and_duplicates() {
        let test_db = TestDb::new();
        let cycle = one(vec![
            ContentRecord::new("root", None, "c1", "series", "Root"),
            ContentRecord::new("a", Some("b".into()), "c1", "season", "A"),
            ContentRecord::new("b", Some("a".into()), "c1", "season", "B"),
        ]);
        let err = import_snapshot(test_db.db(), &cycle, false).unwrap_err();
        assert!(matches!(err, CanopyError::InvalidInput(msg) if msg.contains("cycle")));

        let twice = one(vec![
            ContentRecord::new("a", None, "c1", "series", "A"),
            ContentRecord::new("a", None, "c1", "series", "A again"),
        ]);
        assert!(import_snapshot(test_db.db(), &twice, false).is_err());
        assert_eq!(test_db.db().count(), 0);
    }

    #[test]
    fn test_import_under_stored_parent() {
        let test_db = TestDb::with_sample();
        let snapshot = CollectionSnapshot {
            collection_id: "c1".into(),
            collection_name: "Whoniverse".into(),
            items: vec![ContentRecord::new("ep4", Some("season2".into()), "c1", "episode", "Ep 4")],
        };
        import_snapshot(test_db.db(), &snapshot, false).unwrap();
        assert_eq!(test_db.db().children_of("season2").unwrap().len(), 2);
    }

    #[test]
    fn test_import_rejects_nul_ids() {
        let test_db = TestDb::new();
        let snapshot = one(vec![ContentRecord::new("a\0b", None, "c1", "series", "A")]);
        let err = import_snapshot(test_db.db(), &snapshot, false).unwrap_err();
        assert!(matches!(err, CanopyError::DbError(_)));
        assert!(test_db.db().list_collections().unwrap().is_empty());
    }

    #[test]
    fn test_import_malformed_json() {
        let test_db = TestDb::new();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = import(test_db.db(), &path, false, true).unwrap_err();
        assert!(matches!(err, CanopyError::JsonError(_)));
    }
}
