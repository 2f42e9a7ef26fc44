//! Affected-set planning for cascading bulk operations
//!
//! Summing subtree sizes per selected node double counts whenever a node and
//! one of its ancestors are both selected. The planner instead builds the
//! union of the selection and every selected node's descendants.

use std::collections::HashSet;

use crate::tree::{PreOrder, Tree, TreeNode};

/// Statistics shown before a bulk operation is confirmed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Selected ids that exist in the tree
    pub selected_count: usize,
    /// Distinct immediate children of selected nodes
    pub direct_children_count: usize,
    /// Size of the affected set (selection plus all descendants)
    pub total_affected_count: usize,
    /// `true` iff the operation reaches beyond the explicit selection
    pub has_nested_items: bool,
}

impl Statistics {
    /// Confirmation warning for a cascading delete
    #[must_use]
    pub fn warning_message(&self) -> String {
        if self.has_nested_items {
            format!(
                "This will also delete all child items ({} total items). This action cannot be undone.",
                self.total_affected_count
            )
        } else {
            "This action cannot be undone.".to_string()
        }
    }
}

/// Selected nodes in pre-order, ids absent from the tree dropped
fn selected_nodes<'a>(selected: &HashSet<String>, tree: &'a Tree) -> Vec<&'a TreeNode> {
    let nodes: Vec<&TreeNode> = tree.iter().filter(|n| selected.contains(&n.id)).collect();
    if nodes.len() < selected.len() {
        let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        for id in selected.iter().filter(|id| !known.contains(id.as_str())) {
            tracing::debug!(%id, "ignoring selected id absent from tree");
        }
    }
    nodes
}

fn affected_set<'a>(nodes: &[&'a TreeNode]) -> HashSet<&'a str> {
    let mut affected = HashSet::new();
    // `nodes` is in pre-order, so a selected ancestor is always seen first
    // and its subtree never has to be walked twice.
    for node in nodes {
        if !affected.insert(node.id.as_str()) {
            continue;
        }
        affected.extend(PreOrder::new(&node.children).map(|n| n.id.as_str()));
    }
    affected
}

/// Compute confirmation statistics for a selection
#[must_use]
pub fn plan(selected: &HashSet<String>, tree: &Tree) -> Statistics {
    let nodes = selected_nodes(selected, tree);
    if nodes.is_empty() {
        return Statistics::default();
    }

    let affected = affected_set(&nodes);
    let direct_children: HashSet<&str> = nodes
        .iter()
        .flat_map(|node| node.children.iter().map(|c| c.id.as_str()))
        .collect();

    Statistics {
        selected_count: nodes.len(),
        direct_children_count: direct_children.len(),
        total_affected_count: affected.len(),
        has_nested_items: affected.len() > nodes.len(),
    }
}

/// The affected set in tree pre-order
///
/// This is the authoritative list of items a cascading delete must remove.
#[must_use]
pub fn affected_ids(selected: &HashSet<String>, tree: &Tree) -> Vec<String> {
    let nodes = selected_nodes(selected, tree);
    let affected = affected_set(&nodes);
    tree.iter()
        .filter(|n| affected.contains(n.id.as_str()))
        .map(|n| n.id.clone())
        .collect()
}
