//! Tree and context commands

use crate::{CanopyError, output, store::ContentStore, tree};

type Result<T> = std::result::Result<T, CanopyError>;

/// Execute the tree command - print a collection as a tree
///
/// # Errors
/// Returns an error if the collection cannot be fetched.
pub fn execute<S>(store: &S, collection: &str, show_ids: bool, quiet: bool) -> Result<()>
where
    S: ContentStore + ?Sized,
{
    let tree = store.fetch_tree(collection)?;

    if tree.is_empty() && !quiet {
        println!("{} is empty.", tree.collection_name);
        return Ok(());
    }
    for line in output::render_tree(&tree, show_ids, quiet) {
        println!("{line}");
    }
    if !quiet {
        println!(
            "\n{} item(s), {} level(s), {} leaf item(s)",
            tree.len(),
            tree::max_depth(&tree),
            tree::leaf_nodes(&tree).len()
        );
    }
    Ok(())
}

/// Execute the context command - print the breadcrumb of an item
///
/// # Errors
/// Returns an error if the collection cannot be fetched or the item is not in it.
pub fn context<S>(store: &S, collection: &str, id: &str, quiet: bool) -> Result<()>
where
    S: ContentStore + ?Sized,
{
    let tree = store.fetch_tree(collection)?;
    let node = tree::find_by_id(&tree, id)
        .ok_or_else(|| CanopyError::InvalidInput(format!("Item '{id}' is not part of {collection}")))?;

    if quiet {
        println!("{}", tree::hierarchy_context(&tree, id));
    } else {
        println!("{} {}", node.title, output::context_suffix(&tree, id));
        if node.has_children() {
            println!("  contains {} item(s)", tree::count_descendants(node));
        }
    }
    Ok(())
}
