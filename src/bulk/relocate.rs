use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;

use super::execute::{ExecuteOptions, dispatch};
use super::result::BulkOperationResult;
use crate::store::{ContentStore, ItemPatch};
use crate::tree::{Tree, TreeNode, find_by_id, is_ancestor};

/// Where a bulk move places the selected items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Top level of the collection
    Root,
    /// Under an existing item
    Item(String),
}

impl Destination {
    /// `"root"` selects the top level, anything else is an item id
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value == "root" {
            Self::Root
        } else {
            Self::Item(value.to_string())
        }
    }

    #[must_use]
    pub fn parent_id(&self) -> Option<String> {
        match self {
            Self::Root => None,
            Self::Item(id) => Some(id.clone()),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Item(id) => write!(f, "{id}"),
        }
    }
}

/// Rejected move destinations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("No items selected")]
    NoSelection,

    #[error("Cannot move items to themselves")]
    IntoSelf,

    #[error("Destination no longer exists: {0}")]
    DestinationMissing(String),

    #[error("Cannot move items into their own descendants")]
    IntoDescendant,
}

fn selected_in_tree<'a>(selected: &HashSet<String>, tree: &'a Tree) -> Vec<&'a TreeNode> {
    tree.iter().filter(|n| selected.contains(&n.id)).collect()
}

/// Check that `destination` can receive the selected items
///
/// # Errors
///
/// Returns `MoveError` if nothing in the selection exists in the tree, the
/// destination is itself selected, no longer exists, or lies below a
/// selected item.
pub fn validate_move_destination(
    selected: &HashSet<String>,
    destination: &Destination,
    tree: &Tree,
) -> Result<(), MoveError> {
    let nodes = selected_in_tree(selected, tree);
    if nodes.is_empty() {
        return Err(MoveError::NoSelection);
    }

    let Destination::Item(dest) = destination else {
        return Ok(());
    };
    if selected.contains(dest) {
        return Err(MoveError::IntoSelf);
    }
    if find_by_id(tree, dest).is_none() {
        return Err(MoveError::DestinationMissing(dest.clone()));
    }
    if nodes.iter().any(|node| is_ancestor(tree, &node.id, dest)) {
        return Err(MoveError::IntoDescendant);
    }
    Ok(())
}

/// Move every selected item under `destination`
///
/// Items are appended after the destination's current children, keeping
/// their pre-order position relative to each other. One `update_item` call
/// is issued per item; failures are collected like in
/// [`execute_delete`](super::execute_delete), except that a missing item is
/// reported as a failure.
///
/// # Errors
///
/// Returns `MoveError` if the destination is rejected by
/// [`validate_move_destination`]. No store call is made in that case.
pub fn execute_move<S>(
    store: &S,
    selected: &HashSet<String>,
    destination: &Destination,
    tree: &Tree,
    options: &ExecuteOptions,
) -> Result<BulkOperationResult, MoveError>
where
    S: ContentStore + ?Sized,
{
    validate_move_destination(selected, destination, tree)?;

    let base = match destination {
        Destination::Root => tree.roots.len(),
        Destination::Item(dest) => find_by_id(tree, dest).map_or(0, |n| n.children.len()),
    };
    let moving: Vec<String> = selected_in_tree(selected, tree)
        .into_iter()
        .map(|n| n.id.clone())
        .collect();
    let positions: HashMap<&str, u32> = moving
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), u32::try_from(base + i).unwrap_or(u32::MAX)))
        .collect();

    tracing::info!(
        collection = %tree.collection_id,
        items = moving.len(),
        %destination,
        "starting bulk move"
    );

    let parent_id = destination.parent_id();
    let result = dispatch(moving.clone(), options, |id| {
        let order_index = positions.get(id).copied().unwrap_or_default();
        store.update_item(id, &ItemPatch::relocate(parent_id.clone(), order_index))
    });

    tracing::info!(
        succeeded = result.success_count,
        failed = result.failure_count,
        "bulk move finished"
    );
    Ok(result)
}
