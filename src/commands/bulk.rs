//! Plan, delete and move commands
//!
//! Each command fetches a fresh snapshot, builds a selection from the CLI
//! arguments and hands it to the bulk engine.

use colored::Colorize;
use dialoguer::Confirm;

use crate::bulk::{
    BatchOutcome, BulkOperationResult, Destination, ExecuteOptions, affected_ids,
    execute_delete, execute_move, plan as plan_selection, validate_move_destination,
};
use crate::cli::{BulkArgs, SelectionArgs};
use crate::output;
use crate::selection::SelectionState;
use crate::store::ContentStore;
use crate::tree::{Tree, find_by_id, hierarchy_context};
use crate::CanopyError;

type Result<T> = std::result::Result<T, CanopyError>;

/// Build a selection from CLI arguments
///
/// Ids absent from the snapshot are reported and left out.
#[must_use]
pub fn select(tree: &Tree, args: &SelectionArgs, quiet: bool) -> SelectionState {
    let mut state = SelectionState::new();
    state.enter_selecting();
    if args.all {
        state.select_all(tree);
    } else {
        state.select_many(&args.ids, tree);
        for id in args.ids.iter().filter(|id| !state.is_selected(id)) {
            tracing::debug!(%id, "requested id not in collection");
            if !quiet {
                eprintln!("{} {id} is not part of {}", "Skipping:".yellow(), tree.collection_name);
            }
        }
    }
    state
}

fn options_for(args: &BulkArgs, defaults: &ExecuteOptions) -> ExecuteOptions {
    match args.concurrency {
        Some(n) => defaults.clone().with_concurrency(n.max(1)),
        None => defaults.clone(),
    }
}

fn confirm(prompt: String) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CanopyError::InvalidInput(format!("Failed to get confirmation: {e}")))
}

fn finish(result: &BulkOperationResult, operation: &str, quiet: bool) -> Result<()> {
    if quiet {
        for failure in &result.failures {
            eprintln!("{}: {}", failure.id, failure.error);
        }
    } else {
        result.print(operation);
    }
    match result.outcome() {
        BatchOutcome::Partial | BatchOutcome::Failed => Err(CanopyError::BulkFailed {
            failed: result.failure_count,
            total: result.success_count + result.failure_count,
        }),
        BatchOutcome::Nothing | BatchOutcome::Complete => Ok(()),
    }
}

/// Execute the plan command - show what a cascading operation would touch
///
/// # Errors
/// Returns an error if the collection cannot be fetched.
pub fn plan<S>(store: &S, collection: &str, args: &SelectionArgs, quiet: bool) -> Result<()>
where
    S: ContentStore + ?Sized,
{
    let tree = store.fetch_tree(collection)?;
    let state = select(&tree, args, quiet);
    let stats = plan_selection(state.selected(), &tree);

    if quiet {
        for id in affected_ids(state.selected(), &tree) {
            println!("{id}");
        }
        return Ok(());
    }

    println!("{}", "=== Plan ===".bold());
    for line in output::format_statistics(&stats) {
        println!("{line}");
    }
    for node in state.selected_nodes(&tree) {
        println!("  - {} ({})", node.title, hierarchy_context(&tree, &node.id));
    }
    Ok(())
}

/// Execute the delete command - remove the selection and everything below it
///
/// Returns `Ok(())` without deleting when the user declines the prompt.
///
/// # Errors
/// Returns an error if the collection cannot be fetched, the prompt fails, or
/// any item could not be deleted (`CanopyError::BulkFailed`).
pub fn delete<S>(
    store: &S,
    collection: &str,
    selection: &SelectionArgs,
    bulk: &BulkArgs,
    defaults: &ExecuteOptions,
    quiet: bool,
) -> Result<()>
where
    S: ContentStore + ?Sized,
{
    let tree = store.fetch_tree(collection)?;
    let mut state = select(&tree, selection, quiet);
    if !state.has_selection() {
        if !quiet {
            println!("Nothing selected.");
        }
        return Ok(());
    }

    let stats = plan_selection(state.selected(), &tree);
    if bulk.dry_run {
        println!("{}", "=== Dry Run Mode ===".yellow().bold());
        println!("Would delete {} item(s)", stats.total_affected_count);
        for line in output::format_preview(&affected_ids(state.selected(), &tree), &tree) {
            println!("{line}");
        }
        println!("\n{}", "Run without --dry-run to apply changes.".yellow());
        return Ok(());
    }

    if !bulk.yes {
        println!("{}", stats.warning_message().yellow());
        if !confirm(format!("Delete {} selected item(s)?", stats.selected_count))? {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let result = execute_delete(store, state.selected(), &tree, &options_for(bulk, defaults));
    state.apply_outcome(&result);
    finish(&result, "Delete", quiet)
}

/// Execute the move command - re-parent the selection under `to`
///
/// # Errors
/// Returns an error if the collection cannot be fetched, the destination is
/// rejected, the prompt fails, or any item could not be moved.
pub fn relocate<S>(
    store: &S,
    collection: &str,
    selection: &SelectionArgs,
    to: &Destination,
    bulk: &BulkArgs,
    defaults: &ExecuteOptions,
    quiet: bool,
) -> Result<()>
where
    S: ContentStore + ?Sized,
{
    let tree = store.fetch_tree(collection)?;
    let mut state = select(&tree, selection, quiet);
    validate_move_destination(state.selected(), to, &tree)?;

    let target = match to {
        Destination::Root => tree.collection_name.clone(),
        Destination::Item(id) => find_by_id(&tree, id).map_or_else(|| id.clone(), |n| n.title.clone()),
    };

    if bulk.dry_run {
        println!("{}", "=== Dry Run Mode ===".yellow().bold());
        println!("Would move {} item(s) to {target}", state.selected_count());
        let moving: Vec<String> = state.selected_nodes(&tree).iter().map(|n| n.id.clone()).collect();
        for line in output::format_preview(&moving, &tree) {
            println!("{line}");
        }
        println!("\n{}", "Run without --dry-run to apply changes.".yellow());
        return Ok(());
    }

    if !bulk.yes && !confirm(format!("Move {} item(s) to {target}?", state.selected_count()))? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let result = execute_move(store, state.selected(), to, &tree, &options_for(bulk, defaults))?;
    state.apply_outcome(&result);
    finish(&result, "Move", quiet)
}
