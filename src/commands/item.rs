//! Add and rename commands

use crate::store::{ContentStore, ItemPatch};
use crate::tree::ContentRecord;
use crate::{CanopyError, db::Database};

type Result<T> = std::result::Result<T, CanopyError>;

/// New item as given on the command line
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub id: Option<String>,
    pub title: String,
    pub parent: Option<String>,
    pub kind: String,
    pub description: Option<String>,
}

/// Execute the add command - append an item after its future siblings
///
/// # Returns
/// The id of the new item
///
/// # Errors
/// Returns an error if the title is empty, the collection does not exist or
/// the parent is rejected by the database.
pub fn execute(db: &Database, collection: &str, item: NewItem, quiet: bool) -> Result<String> {
    if item.title.trim().is_empty() {
        return Err(CanopyError::InvalidInput("Title cannot be empty".into()));
    }
    let id = item.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    if db.contains(&id)? {
        return Err(CanopyError::InvalidInput(format!("Item '{id}' already exists")));
    }

    let siblings = match &item.parent {
        Some(parent) => db.children_of(parent)?.len(),
        None => db
            .items_in_collection(collection)?
            .iter()
            .filter(|r| r.parent_id.is_none())
            .count(),
    };
    let mut record = ContentRecord::new(&id, item.parent, collection, item.kind, item.title)
        .with_order(u32::try_from(siblings).unwrap_or(u32::MAX));
    record.description = item.description;

    db.insert_item(&record)?;
    tracing::debug!(%id, collection, "item added");
    if quiet {
        println!("{id}");
    } else {
        println!("Added {} [{id}]", record.title);
    }
    Ok(id)
}

/// Execute the rename command
///
/// # Errors
/// Returns an error if the title is empty or the item does not exist.
pub fn rename(db: &Database, id: &str, title: &str, quiet: bool) -> Result<()> {
    if title.trim().is_empty() {
        return Err(CanopyError::InvalidInput("Title cannot be empty".into()));
    }
    let patch = ItemPatch {
        title: Some(title.to_string()),
        ..ItemPatch::default()
    };
    db.update_item(id, &patch)?;
    if !quiet {
        println!("Renamed {id} to {title}");
    }
    Ok(())
}
