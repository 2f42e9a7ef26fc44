//! Output formatting for CLI display
//!
//! Renders trees, planning statistics and previews. Everything returns
//! strings so the commands decide where output goes.

use colored::Colorize;

use crate::bulk::Statistics;
use crate::tree::{Tree, TreeNode, find_by_id, hierarchy_context};

/// Number of ids listed in a dry-run preview before it is truncated
pub const PREVIEW_LIMIT: usize = 15;

/// One line for a node: title, kind and optionally its id
#[must_use]
pub fn item_label(node: &TreeNode, show_ids: bool) -> String {
    let mut label = format!("{} {}", node.title.bold(), format!("({})", node.kind).dimmed());
    if show_ids {
        label.push_str(&format!(" [{}]", node.id).cyan().to_string());
    }
    label
}

/// `"in <parent> in ... in <collection>"`, dimmed
#[must_use]
pub fn context_suffix(tree: &Tree, id: &str) -> String {
    format!("in {}", hierarchy_context(tree, id)).dimmed().to_string()
}

/// Render a collection with box-drawing connectors
///
/// In quiet mode only the ids are printed, one per line in pre-order.
#[must_use]
pub fn render_tree(tree: &Tree, show_ids: bool, quiet: bool) -> Vec<String> {
    if quiet {
        return tree.iter().map(|n| n.id.clone()).collect();
    }
    let mut lines = vec![tree.collection_name.green().bold().to_string()];
    render_level(&tree.roots, "", show_ids, &mut lines);
    lines
}

fn render_level(nodes: &[TreeNode], prefix: &str, show_ids: bool, lines: &mut Vec<String>) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let connector = if last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{connector}{}", item_label(node, show_ids)));
        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        render_level(&node.children, &child_prefix, show_ids, lines);
    }
}

/// Planning statistics as display lines
#[must_use]
pub fn format_statistics(stats: &Statistics) -> Vec<String> {
    vec![
        format!("  Selected items:   {}", stats.selected_count),
        format!("  Direct children:  {}", stats.direct_children_count),
        format!("  Total affected:   {}", stats.total_affected_count),
        format!(
            "  Nested items:     {}",
            if stats.has_nested_items { "yes".yellow() } else { "no".normal() }
        ),
    ]
}

/// Preview of the items an operation would touch, truncated after
/// [`PREVIEW_LIMIT`] entries
#[must_use]
pub fn format_preview(ids: &[String], tree: &Tree) -> Vec<String> {
    let mut lines: Vec<String> = ids
        .iter()
        .take(PREVIEW_LIMIT)
        .enumerate()
        .map(|(i, id)| match find_by_id(tree, id) {
            Some(node) => format!("  {}. {} [{id}]", i + 1, node.title),
            None => format!("  {}. [{id}]", i + 1),
        })
        .collect();
    if ids.len() > PREVIEW_LIMIT {
        lines.push(format!("  ... and {} more", ids.len() - PREVIEW_LIMIT));
    }
    lines
}
