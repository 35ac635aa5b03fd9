// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::HistoryId;

/// Records marked for bulk deletion. Ids that drop out of view are left in
/// place; `select_all` and bulk deletes are what reset the set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    ids: BTreeSet<HistoryId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `id` is selected afterwards.
    pub fn toggle(&mut self, id: HistoryId) -> bool {
        if self.ids.remove(&id) {
            return false;
        }
        self.ids.insert(id);
        true
    }

    pub fn set(&mut self, id: HistoryId, selected: bool) {
        if selected {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    /// Replaces the selection with exactly the visible ids.
    pub fn select_all<I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = HistoryId>,
    {
        self.ids = visible.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: HistoryId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<HistoryId> {
        self.ids.iter().copied().collect()
    }

    /// Checked state of the "select all" control; derived, never stored.
    pub fn all_selected(&self, visible_len: usize) -> bool {
        visible_len > 0 && self.ids.len() == visible_len
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionSet;
    use crate::HistoryId;

    fn ids(values: &[i64]) -> Vec<HistoryId> {
        values.iter().copied().map(HistoryId::new).collect()
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = SelectionSet::new();
        assert!(selection.toggle(HistoryId::new(3)));
        assert!(selection.is_selected(HistoryId::new(3)));
        assert!(!selection.toggle(HistoryId::new(3)));
        assert!(selection.is_empty());
    }

    #[test]
    fn set_is_idempotent() {
        let mut selection = SelectionSet::new();
        selection.set(HistoryId::new(1), true);
        selection.set(HistoryId::new(1), true);
        assert_eq!(selection.len(), 1);
        selection.set(HistoryId::new(1), false);
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_replaces_with_visible_ids() {
        let mut selection = SelectionSet::new();
        selection.set(HistoryId::new(99), true);
        selection.select_all(ids(&[1, 2, 3]));

        assert_eq!(selection.ids(), ids(&[1, 2, 3]));
        assert!(!selection.is_selected(HistoryId::new(99)));
        assert!(selection.all_selected(3));
    }

    #[test]
    fn empty_view_is_never_all_selected() {
        let mut selection = SelectionSet::new();
        selection.select_all(Vec::new());
        selection.clear();
        assert!(selection.is_empty());
        assert!(!selection.all_selected(0));
    }

    #[test]
    fn stale_ids_break_the_all_selected_flag() {
        let mut selection = SelectionSet::new();
        selection.select_all(ids(&[1, 2, 3]));
        assert!(!selection.all_selected(2));
    }
}
