use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use super::plan::affected_ids;
use super::result::BulkOperationResult;
use crate::store::{ContentStore, StoreError};
use crate::tree::Tree;

/// Default number of store calls in flight at once
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Cooperative cancellation flag for a running batch
///
/// Cancelling stops further dispatch; calls already issued still complete.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Execution settings for a bulk operation
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Maximum store calls in flight
    pub concurrency: usize,
    pub cancel: CancelToken,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            cancel: CancelToken::new(),
        }
    }
}

impl ExecuteOptions {
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Run `call` once per id with bounded fan-out and collect the outcomes
///
/// Outcomes are recorded in the order of `ids` regardless of completion
/// order. A failure never stops the remaining calls.
pub(crate) fn dispatch<F>(ids: Vec<String>, options: &ExecuteOptions, call: F) -> BulkOperationResult
where
    F: Fn(&str) -> Result<(), StoreError> + Sync,
{
    let cancel = &options.cancel;
    let run_one = |id: String| {
        if cancel.is_cancelled() {
            (id, None)
        } else {
            let outcome = call(&id);
            (id, Some(outcome))
        }
    };

    let outcomes: Vec<(String, Option<Result<(), StoreError>>)> =
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.concurrency.max(1))
            .thread_name(|i| format!("canopy-bulk-{i}"))
            .build()
        {
            Ok(pool) => pool.install(|| ids.into_par_iter().map(run_one).collect()),
            Err(e) => {
                tracing::warn!(error = %e, "worker pool unavailable, running sequentially");
                ids.into_iter().map(run_one).collect()
            }
        };

    let mut result = BulkOperationResult::new();
    for (id, outcome) in outcomes {
        match outcome {
            Some(Ok(())) => result.add_success(id),
            Some(Err(error)) => {
                tracing::warn!(%id, %error, "bulk item failed");
                result.add_failure(id, error);
            }
            None => result.add_skip(id),
        }
    }
    result
}

/// Delete every selected item together with all of its descendants
///
/// The affected set (selection plus transitive descendants, pre-order) gets
/// one `delete_item` call per id. An item the store reports as not found is
/// already gone and counts as deleted. Other failures are collected and the
/// batch carries on; nothing is retried. The given tree is not modified:
/// reconcile with [`Tree::without`] using `result.succeeded`.
pub fn execute_delete<S>(
    store: &S,
    selected: &HashSet<String>,
    tree: &Tree,
    options: &ExecuteOptions,
) -> BulkOperationResult
where
    S: ContentStore + ?Sized,
{
    let affected = affected_ids(selected, tree);
    tracing::info!(
        collection = %tree.collection_id,
        selected = selected.len(),
        affected = affected.len(),
        "starting bulk delete"
    );

    let result = dispatch(affected, options, |id| match store.delete_item(id) {
        Err(e) if e.is_not_found() => {
            tracing::debug!(%id, "already absent, counted as deleted");
            Ok(())
        }
        other => other,
    });

    tracing::info!(
        succeeded = result.success_count,
        failed = result.failure_count,
        skipped = result.skipped.len(),
        "bulk delete finished"
    );
    result
}
