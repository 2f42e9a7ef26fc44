//! Pure traversal functions over a [`Tree`] snapshot
//!
//! Nothing here keeps state between calls; every function can be re-run on
//! the same snapshot and yields the same result.

use super::{Tree, TreeNode};

/// Pre-order iterator: a node is yielded before its children, children in
/// their stored order.
pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> PreOrder<'a> {
    #[must_use]
    pub fn new(nodes: &'a [TreeNode]) -> Self {
        Self {
            stack: nodes.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Flatten a tree into pre-order
#[must_use]
pub fn flatten(tree: &Tree) -> Vec<&TreeNode> {
    tree.iter().collect()
}

/// First node in pre-order with the given id
#[must_use]
pub fn find_by_id<'a>(tree: &'a Tree, id: &str) -> Option<&'a TreeNode> {
    tree.iter().find(|node| node.id == id)
}

/// Titles of all strict ancestors of `id`, from the root down to its parent
///
/// Returns `None` if the node is not in the tree and an empty vector for a
/// root node.
#[must_use]
pub fn ancestor_path(tree: &Tree, id: &str) -> Option<Vec<String>> {
    fn search(nodes: &[TreeNode], id: &str, path: &mut Vec<String>) -> bool {
        for node in nodes {
            if node.id == id {
                return true;
            }
            path.push(node.title.clone());
            if search(&node.children, id, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    search(&tree.roots, id, &mut path).then_some(path)
}

/// Breadcrumb context such as `"Doctor Who in Season 1 in Whoniverse"`
///
/// Falls back to the bare collection name for roots and unknown ids.
#[must_use]
pub fn hierarchy_context(tree: &Tree, id: &str) -> String {
    match ancestor_path(tree, id) {
        Some(path) if !path.is_empty() => {
            format!("{} in {}", path.join(" in "), tree.collection_name)
        }
        _ => tree.collection_name.clone(),
    }
}

/// Number of nodes in the subtree below `node`, the node itself excluded
#[must_use]
pub fn count_descendants(node: &TreeNode) -> usize {
    node.children
        .iter()
        .map(|child| 1 + count_descendants(child))
        .sum()
}

/// All descendants of `node` in pre-order
#[must_use]
pub fn descendants(node: &TreeNode) -> Vec<&TreeNode> {
    PreOrder::new(&node.children).collect()
}

/// Whether `node_id` sits somewhere below `ancestor_id`
#[must_use]
pub fn is_ancestor(tree: &Tree, ancestor_id: &str, node_id: &str) -> bool {
    find_by_id(tree, ancestor_id)
        .is_some_and(|ancestor| PreOrder::new(&ancestor.children).any(|n| n.id == node_id))
}

/// Depth of a node (roots are depth 0)
#[must_use]
pub fn depth_of(tree: &Tree, id: &str) -> Option<usize> {
    ancestor_path(tree, id).map(|path| path.len())
}

/// Depth of the deepest node, 0 for an empty or flat tree
#[must_use]
pub fn max_depth(tree: &Tree) -> usize {
    fn deepest(node: &TreeNode) -> usize {
        node.children
            .iter()
            .map(|child| 1 + deepest(child))
            .max()
            .unwrap_or(0)
    }
    tree.roots.iter().map(deepest).max().unwrap_or(0)
}

/// Nodes without children, in pre-order
#[must_use]
pub fn leaf_nodes(tree: &Tree) -> Vec<&TreeNode> {
    tree.iter().filter(|node| node.children.is_empty()).collect()
}
