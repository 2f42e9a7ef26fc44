use colored::Colorize;

use crate::store::StoreError;

/// A per-item failure collected during a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub id: String,
    pub error: StoreError,
}

/// How a finished batch should be reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Nothing was attempted
    Nothing,
    /// Every attempted item succeeded
    Complete,
    /// Some items succeeded, some failed
    Partial,
    /// No item succeeded
    Failed,
}

/// Aggregate result of one bulk operation
///
/// Created fresh per execution and handed to the caller once. Ids appear in
/// affected-set order within each list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOperationResult {
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<ItemFailure>,
    /// Ids the store confirmed (or already had absent, for deletes)
    pub succeeded: Vec<String>,
    /// Ids never dispatched because the batch was cancelled
    pub skipped: Vec<String>,
}

impl BulkOperationResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success(&mut self, id: String) {
        self.success_count += 1;
        self.succeeded.push(id);
    }

    pub fn add_failure(&mut self, id: String, error: StoreError) {
        self.failure_count += 1;
        self.failures.push(ItemFailure { id, error });
    }

    pub fn add_skip(&mut self, id: String) {
        self.skipped.push(id);
    }

    #[must_use]
    pub const fn outcome(&self) -> BatchOutcome {
        match (self.success_count, self.failure_count) {
            (0, 0) => BatchOutcome::Nothing,
            (_, 0) => BatchOutcome::Complete,
            (0, _) => BatchOutcome::Failed,
            _ => BatchOutcome::Partial,
        }
    }

    /// Whether the caller should reset its selection
    #[must_use]
    pub const fn should_reset_selection(&self) -> bool {
        self.success_count > 0
    }

    pub fn print(&self, operation: &str) {
        println!("\n{}", format!("=== {operation} Summary ===").bold());
        println!("  {} {}", "✓ Success:".green(), self.success_count);
        if !self.skipped.is_empty() {
            println!("  {} {}", "⊘ Skipped:".yellow(), self.skipped.len());
        }
        if self.failure_count > 0 {
            println!("  {} {}", "✗ Errors:".red(), self.failure_count);
            println!("\n{}", "Error details:".red().bold());
            for failure in &self.failures {
                println!("  - {}: {}", failure.id, failure.error);
            }
        }
        match self.outcome() {
            BatchOutcome::Partial => println!(
                "\n{}",
                format!(
                    "Partial success: {} succeeded, {} failed",
                    self.success_count, self.failure_count
                )
                .yellow()
            ),
            BatchOutcome::Failed => println!(
                "\n{}",
                "Operation failed for every item. Selection kept, please try again.".red()
            ),
            BatchOutcome::Nothing | BatchOutcome::Complete => {}
        }
    }
}
