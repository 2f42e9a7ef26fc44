//! Content tree model
//!
//! A collection (one "universe") is a forest of content items. Each node owns
//! its children exclusively, so removing a node removes its whole subtree.
//!
//! # Types
//!
//! - **`ContentRecord`**: flat storage form of one item, as kept by a store
//! - **`TreeNode`**: an item together with its ordered, owned children
//! - **`Tree`**: a snapshot of one collection (name + ordered roots)
//!
//! Trees are assembled from flat records with [`build_tree`]. Traversal
//! helpers live in [`traversal`].

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub mod traversal;

pub use traversal::{
    PreOrder, ancestor_path, count_descendants, depth_of, descendants, find_by_id, flatten,
    hierarchy_context, is_ancestor, leaf_nodes, max_depth,
};

/// Flat storage form of a content item
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ContentRecord {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub collection_id: String,
    /// Item classification (film, season, user-defined...). Never interpreted.
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: u32,
    /// Creation time in milliseconds since the unix epoch
    #[serde(default)]
    pub created_at: i64,
}

impl ContentRecord {
    /// Create a record with a fresh creation timestamp
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        parent_id: Option<String>,
        collection_id: impl Into<String>,
        kind: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id,
            collection_id: collection_id.into(),
            kind: kind.into(),
            title: title.into(),
            description: None,
            order_index: 0,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    #[must_use]
    pub const fn with_order(mut self, order_index: u32) -> Self {
        self.order_index = order_index;
        self
    }
}

/// Content item with its owned children
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub collection_id: String,
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub order_index: u32,
    pub created_at: i64,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn from_record(record: ContentRecord) -> Self {
        Self {
            id: record.id,
            parent_id: record.parent_id,
            collection_id: record.collection_id,
            kind: record.kind,
            title: record.title,
            description: record.description,
            order_index: record.order_index,
            created_at: record.created_at,
            children: Vec::new(),
        }
    }

    /// Flat record for this node, children dropped
    #[must_use]
    pub fn record(&self) -> ContentRecord {
        ContentRecord {
            id: self.id.clone(),
            parent_id: self.parent_id.clone(),
            collection_id: self.collection_id.clone(),
            kind: self.kind.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            order_index: self.order_index,
            created_at: self.created_at,
        }
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    fn without(&self, removed: &HashSet<String>) -> Self {
        let mut node = self.clone_shallow();
        node.children = prune(&self.children, removed);
        node
    }

    fn clone_shallow(&self) -> Self {
        Self {
            id: self.id.clone(),
            parent_id: self.parent_id.clone(),
            collection_id: self.collection_id.clone(),
            kind: self.kind.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            order_index: self.order_index,
            created_at: self.created_at,
            children: Vec::new(),
        }
    }
}

fn prune(nodes: &[TreeNode], removed: &HashSet<String>) -> Vec<TreeNode> {
    nodes
        .iter()
        .filter(|node| !removed.contains(&node.id))
        .map(|node| node.without(removed))
        .collect()
}

/// Snapshot of one collection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    pub collection_id: String,
    pub collection_name: String,
    pub roots: Vec<TreeNode>,
}

impl Tree {
    #[must_use]
    pub fn new(collection_id: impl Into<String>, collection_name: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            collection_name: collection_name.into(),
            roots: Vec::new(),
        }
    }

    /// Pre-order iterator over every node
    #[must_use]
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder::new(&self.roots)
    }

    /// Total number of nodes at all depths
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Copy of this tree with the given nodes, and therefore their subtrees, removed
    ///
    /// Used to reconcile a local snapshot after a bulk delete: pass only the
    /// ids the store confirmed as deleted.
    #[must_use]
    pub fn without(&self, removed: &HashSet<String>) -> Self {
        Self {
            collection_id: self.collection_id.clone(),
            collection_name: self.collection_name.clone(),
            roots: prune(&self.roots, removed),
        }
    }

    /// All nodes flattened back into storage records, in pre-order
    #[must_use]
    pub fn records(&self) -> Vec<ContentRecord> {
        self.iter().map(TreeNode::record).collect()
    }
}

/// Assemble a tree from flat records
///
/// Records are ordered by `order_index` (stable, so ties keep input order) and
/// attached to their parent. Records whose parent is not part of `records`
/// cannot be reached from any root and are left out of the snapshot.
#[must_use]
pub fn build_tree(
    collection_id: impl Into<String>,
    collection_name: impl Into<String>,
    mut records: Vec<ContentRecord>,
) -> Tree {
    records.sort_by_key(|r| r.order_index);

    let mut roots = Vec::new();
    let mut by_parent: HashMap<String, Vec<ContentRecord>> = HashMap::new();
    for record in records {
        match record.parent_id.clone() {
            Some(parent) => by_parent.entry(parent).or_default().push(record),
            None => roots.push(record),
        }
    }

    let roots: Vec<TreeNode> = roots
        .into_iter()
        .map(|record| assemble(record, &mut by_parent))
        .collect();

    for orphans in by_parent.values() {
        for orphan in orphans {
            tracing::debug!(id = %orphan.id, "dropping record with unknown parent");
        }
    }

    Tree {
        collection_id: collection_id.into(),
        collection_name: collection_name.into(),
        roots,
    }
}

// Each record is taken out of the map once, so parent cycles can never be
// reached from a root and assembly always terminates.
fn assemble(record: ContentRecord, by_parent: &mut HashMap<String, Vec<ContentRecord>>) -> TreeNode {
    let mut node = TreeNode::from_record(record);
    if let Some(children) = by_parent.remove(&node.id) {
        node.children = children
            .into_iter()
            .map(|child| assemble(child, by_parent))
            .collect();
    }
    node
}
