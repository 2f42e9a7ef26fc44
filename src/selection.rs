//! Selection state over a content tree
//!
//! A [`SelectionState`] pairs a set of selected ids with a [`SelectionMode`].
//! Membership is flat: selecting a parent does not add its children. Cascades
//! are computed on demand by [`crate::bulk::plan`].
//!
//! Every transition is a pure function of the previous state and a
//! [`SelectionAction`] (see [`reduce`]); the `&mut self` methods are thin
//! wrappers around it.
//!
//! # State machine
//!
//! ```text
//!            enter_selecting
//!  Browsing ─────────────────▶ Selecting
//!     ▲                            │
//!     └──── exit_selecting ────────┘   (clears the set)
//! ```

use std::collections::HashSet;

use crate::bulk::BulkOperationResult;
use crate::tree::{Tree, TreeNode};

/// Whether the tree view is browsing or picking items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Browsing,
    Selecting,
}

/// A single selection transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    /// Flip membership of one id
    Toggle(String),
    /// Replace the set with every id in the tree
    SelectAll(Vec<String>),
    /// Replace the set with the given ids
    Replace(Vec<String>),
    /// Empty the set
    Clear,
    EnterSelecting,
    /// Leave selecting mode and empty the set
    ExitSelecting,
}

/// Selected ids plus the current mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: HashSet<String>,
    mode: SelectionMode,
}

/// Apply one action to a state
#[must_use]
pub fn reduce(mut state: SelectionState, action: SelectionAction) -> SelectionState {
    match action {
        SelectionAction::Toggle(id) => {
            if !state.selected.remove(&id) {
                state.selected.insert(id);
            }
        }
        SelectionAction::SelectAll(ids) | SelectionAction::Replace(ids) => {
            state.selected = ids.into_iter().collect();
        }
        SelectionAction::Clear => state.selected.clear(),
        SelectionAction::EnterSelecting => state.mode = SelectionMode::Selecting,
        SelectionAction::ExitSelecting => {
            state.mode = SelectionMode::Browsing;
            state.selected.clear();
        }
    }
    state
}

impl SelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(&mut self, action: SelectionAction) {
        *self = reduce(std::mem::take(self), action);
    }

    pub fn toggle(&mut self, id: &str) {
        self.apply(SelectionAction::Toggle(id.to_string()));
    }

    /// Select every node at every depth, replacing the current selection
    pub fn select_all(&mut self, tree: &Tree) {
        let ids = tree.iter().map(|node| node.id.clone()).collect();
        self.apply(SelectionAction::SelectAll(ids));
    }

    /// Replace the selection with those of `ids` present in `tree`
    pub fn select_many<I, S>(&mut self, ids: I, tree: &Tree)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let known: HashSet<&str> = tree.iter().map(|node| node.id.as_str()).collect();
        let ids = ids
            .into_iter()
            .filter(|id| known.contains(id.as_ref()))
            .map(|id| id.as_ref().to_string())
            .collect();
        self.apply(SelectionAction::Replace(ids));
    }

    pub fn clear(&mut self) {
        self.apply(SelectionAction::Clear);
    }

    pub fn enter_selecting(&mut self) {
        self.apply(SelectionAction::EnterSelecting);
    }

    pub fn exit_selecting(&mut self) {
        self.apply(SelectionAction::ExitSelecting);
    }

    /// Drop selected ids that no longer exist in a fresh snapshot
    pub fn retain_existing(&mut self, tree: &Tree) {
        let known: HashSet<&str> = tree.iter().map(|node| node.id.as_str()).collect();
        let ids = self
            .selected
            .iter()
            .filter(|id| known.contains(id.as_str()))
            .cloned()
            .collect();
        self.apply(SelectionAction::Replace(ids));
    }

    /// Settle the selection after a bulk operation
    ///
    /// Any success resets to browsing with an empty set. A batch where nothing
    /// succeeded keeps the selection so the user can retry.
    pub fn apply_outcome(&mut self, result: &BulkOperationResult) {
        if result.success_count > 0 {
            self.exit_selecting();
        }
    }

    #[must_use]
    pub const fn selected(&self) -> &HashSet<String> {
        &self.selected
    }

    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    #[must_use]
    pub fn is_selecting(&self) -> bool {
        self.mode == SelectionMode::Selecting
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    #[must_use]
    pub fn is_all_selected(&self, tree: &Tree) -> bool {
        !tree.is_empty() && tree.iter().all(|node| self.selected.contains(&node.id))
    }

    /// Selected nodes in tree pre-order
    #[must_use]
    pub fn selected_nodes<'a>(&self, tree: &'a Tree) -> Vec<&'a TreeNode> {
        tree.iter()
            .filter(|node| self.selected.contains(&node.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_tree;

    #[test]
    fn test_initial_state() {
        let state = SelectionState::new();
        assert_eq!(state.mode(), SelectionMode::Browsing);
        assert!(!state.has_selection());
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut state = SelectionState::new();
        state.toggle("a");
        assert!(state.is_selected("a"));
        state.toggle("a");
        assert!(!state.is_selected("a"));
        assert_eq!(state.mode(), SelectionMode::Browsing);
    }

    #[test]
    fn test_select_all_replaces() {
        let tree = sample_tree();
        let mut state = SelectionState::new();
        state.toggle("not-in-tree");
        state.select_all(&tree);
        assert_eq!(state.selected_count(), tree.len());
        assert!(!state.is_selected("not-in-tree"));
        assert!(state.is_all_selected(&tree));
    }

    #[test]
    fn test_toggle_parent_does_not_select_children() {
        let mut state = SelectionState::new();
        state.toggle("season1");
        assert!(!state.is_selected("ep1"));
        assert_eq!(state.selected_count(), 1);
    }

    #[test]
    fn test_clear_keeps_mode() {
        let mut state = SelectionState::new();
        state.enter_selecting();
        state.toggle("a");
        state.clear();
        assert!(!state.has_selection());
        assert!(state.is_selecting());
    }

    #[test]
    fn test_enter_selecting_keeps_set() {
        let mut state = SelectionState::new();
        state.toggle("a");
        state.enter_selecting();
        assert!(state.is_selected("a"));
    }

    #[test]
    fn test_exit_selecting_always_clears() {
        let tree = sample_tree();
        let mut state = SelectionState::new();
        state.enter_selecting();
        state.select_all(&tree);
        state.exit_selecting();
        assert!(state.selected().is_empty());
        assert_eq!(state.mode(), SelectionMode::Browsing);

        // Also from browsing with a leftover selection
        let mut state = SelectionState::new();
        state.toggle("x");
        state.exit_selecting();
        assert!(state.selected().is_empty());
    }

    #[test]
    fn test_reduce_is_pure() {
        let before = SelectionState::new();
        let after = reduce(before.clone(), SelectionAction::Toggle("a".into()));
        assert!(!before.is_selected("a"));
        assert!(after.is_selected("a"));
    }

    #[test]
    fn test_select_many_filters_unknown_ids() {
        let tree = sample_tree();
        let mut state = SelectionState::new();
        state.select_many(["ep1", "ghost", "film"], &tree);
        assert_eq!(state.selected_count(), 2);
        assert!(!state.is_selected("ghost"));
    }

    #[test]
    fn test_retain_existing() {
        let tree = sample_tree();
        let mut state = SelectionState::new();
        state.toggle("ep1");
        state.toggle("gone");
        state.retain_existing(&tree);
        assert!(state.is_selected("ep1"));
        assert!(!state.is_selected("gone"));
    }

    #[test]
    fn test_selected_nodes_in_pre_order() {
        let tree = sample_tree();
        let mut state = SelectionState::new();
        state.toggle("film");
        state.toggle("ep1");
        let ids: Vec<_> = state.selected_nodes(&tree).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["ep1", "film"]);
    }

    #[test]
    fn test_apply_outcome_resets_on_any_success() {
        let mut state = SelectionState::new();
        state.enter_selecting();
        state.toggle("a");
        let result = BulkOperationResult {
            success_count: 1,
            failure_count: 2,
            ..BulkOperationResult::default()
        };
        state.apply_outcome(&result);
        assert!(!state.has_selection());
        assert!(!state.is_selecting());
    }

    #[test]
    fn test_apply_outcome_keeps_selection_on_total_failure() {
        let mut state = SelectionState::new();
        state.enter_selecting();
        state.toggle("a");
        let result = BulkOperationResult {
            success_count: 0,
            failure_count: 1,
            ..BulkOperationResult::default()
        };
        state.apply_outcome(&result);
        assert!(state.is_selected("a"));
        assert!(state.is_selecting());
    }
}
