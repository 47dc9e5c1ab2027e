//! Row selection on the displayed page.

use std::collections::BTreeSet;

/// Header checkbox state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllState {
    Checked,
    Indeterminate,
    Unchecked,
}

/// Selected rows, by index into the displayed rows.
///
/// Indices only mean something for the page and order they were taken on;
/// the grid clears the set whenever either changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: BTreeSet<usize>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    /// Flip row `index`. Indices past `row_count` are ignored.
    pub fn toggle(&mut self, index: usize, row_count: usize) -> bool {
        if index >= row_count {
            return false;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
        true
    }

    /// Select every row, or clear if every row is already selected.
    pub fn toggle_all(&mut self, row_count: usize) {
        if self.state(row_count) == SelectAllState::Checked {
            self.selected.clear();
        } else {
            self.selected = (0..row_count).collect();
        }
    }

    /// Drop the selection. Returns false if it was already empty.
    pub fn clear(&mut self) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        self.selected.clear();
        true
    }

    pub fn state(&self, row_count: usize) -> SelectAllState {
        match self.selected.len() {
            0 => SelectAllState::Unchecked,
            n if n >= row_count => SelectAllState::Checked,
            _ => SelectAllState::Indeterminate,
        }
    }

    /// Selected rows out of `rows` (the displayed order).
    pub fn resolve<'a, R>(&self, rows: &'a [R]) -> Vec<&'a R> {
        self.selected.iter().filter_map(|&i| rows.get(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tri_state_header() {
        let mut selection = SelectionSet::new();
        assert_eq!(selection.state(3), SelectAllState::Unchecked);
        selection.toggle(1, 3);
        assert_eq!(selection.state(3), SelectAllState::Indeterminate);
        selection.toggle(0, 3);
        selection.toggle(2, 3);
        assert_eq!(selection.state(3), SelectAllState::Checked);
    }

    #[test]
    fn empty_page_is_unchecked() {
        assert_eq!(SelectionSet::new().state(0), SelectAllState::Unchecked);
    }

    #[test]
    fn toggle_all_selects_then_clears() {
        let mut selection = SelectionSet::new();
        selection.toggle(1, 4);
        selection.toggle_all(4);
        assert_eq!(selection.indices(), vec![0, 1, 2, 3]);
        selection.toggle_all(4);
        assert!(selection.is_empty());
    }

    #[test]
    fn out_of_range_rows_are_ignored() {
        let mut selection = SelectionSet::new();
        assert!(!selection.toggle(5, 2));
        assert!(selection.is_empty());
    }

    #[test]
    fn resolve_maps_indices_to_rows() {
        let mut selection = SelectionSet::new();
        selection.toggle(2, 3);
        selection.toggle(0, 3);
        let rows = ["a", "b", "c"];
        assert_eq!(selection.resolve(&rows), vec![&"a", &"c"]);
    }
}
