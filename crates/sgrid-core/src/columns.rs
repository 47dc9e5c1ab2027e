//! Column visibility and display order.
//!
//! Visibility persists per grid; display order lives only for the session.
//! The two are independent: moving a column never changes whether it shows,
//! and hiding a column keeps its slot in the order.

use std::collections::BTreeSet;
use std::rc::Rc;

use sgrid_model::{ColumnDescriptor, GridId};
use sgrid_persistence::{ColumnPrefs, StoredLayout};
use tracing::{debug, warn};

/// Visible set and display order for one grid's columns.
#[derive(Debug)]
pub struct ColumnManager {
    grid_id: GridId,
    columns: Rc<[ColumnDescriptor]>,
    prefs: ColumnPrefs,
    /// Column indices in display order.
    order: Vec<usize>,
    visible: BTreeSet<usize>,
}

impl ColumnManager {
    /// Restore the layout for `grid_id`.
    ///
    /// A stored, non-empty layout wins; otherwise columns flagged
    /// `show_by_default`; otherwise every column.
    pub fn mount(grid_id: GridId, columns: Rc<[ColumnDescriptor]>, prefs: ColumnPrefs) -> Self {
        let visible = match prefs.load(&grid_id) {
            StoredLayout::Visible(indices) => {
                let in_range: BTreeSet<usize> =
                    indices.into_iter().filter(|&i| i < columns.len()).collect();
                if in_range.is_empty() {
                    debug!(grid = %grid_id, "stored column layout empty, using defaults");
                    default_visible(&columns)
                } else {
                    in_range
                }
            }
            StoredLayout::Corrupt | StoredLayout::Missing => default_visible(&columns),
        };
        Self {
            order: (0..columns.len()).collect(),
            grid_id,
            columns,
            prefs,
            visible,
        }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.contains(&index)
    }

    /// Visible column indices in display order.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.order
            .iter()
            .copied()
            .filter(|i| self.visible.contains(i))
            .collect()
    }

    /// Visible column descriptors in display order.
    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor> {
        self.visible_indices()
            .into_iter()
            .map(|i| &self.columns[i])
            .collect()
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    /// Flip visibility of column `index`. Returns whether anything changed.
    pub fn toggle(&mut self, index: usize) -> bool {
        let show = !self.is_visible(index);
        self.set_visible(index, show)
    }

    /// Show or hide column `index`.
    ///
    /// Unknown indices and hiding the last visible column are refused.
    pub fn set_visible(&mut self, index: usize, show: bool) -> bool {
        if index >= self.columns.len() || self.is_visible(index) == show {
            return false;
        }
        if !show && self.visible.len() == 1 {
            debug!(grid = %self.grid_id, column = index, "refusing to hide last visible column");
            return false;
        }
        if show {
            self.visible.insert(index);
        } else {
            self.visible.remove(&index);
        }
        self.persist();
        true
    }

    /// Move the column at display position `from` to position `to`.
    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        if from >= self.order.len() || to >= self.order.len() || from == to {
            return false;
        }
        let column = self.order.remove(from);
        self.order.insert(to, column);
        true
    }

    /// Restore default visibility and natural order, and forget the stored
    /// layout so later remounts follow the declared defaults.
    pub fn reset(&mut self) {
        self.order = (0..self.columns.len()).collect();
        self.visible = default_visible(&self.columns);
        if let Err(error) = self.prefs.clear(&self.grid_id) {
            warn!(
                grid = %self.grid_id,
                error = %error.user_message(),
                "could not clear stored column layout"
            );
        }
    }

    fn persist(&self) {
        let visible: Vec<usize> = self.visible.iter().copied().collect();
        if let Err(error) = self.prefs.save(&self.grid_id, &visible) {
            warn!(
                grid = %self.grid_id,
                error = %error.user_message(),
                "could not persist column layout"
            );
        }
    }
}

fn default_visible(columns: &[ColumnDescriptor]) -> BTreeSet<usize> {
    let flagged: BTreeSet<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.show_by_default)
        .map(|(i, _)| i)
        .collect();
    if flagged.is_empty() {
        (0..columns.len()).collect()
    } else {
        flagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgrid_persistence::{DurableStore, MemoryStore};

    fn columns() -> Rc<[ColumnDescriptor]> {
        vec![
            ColumnDescriptor::new("id", "ID").shown_by_default(),
            ColumnDescriptor::new("name", "Name").shown_by_default(),
            ColumnDescriptor::new("city", "City"),
            ColumnDescriptor::new("notes", "Notes"),
        ]
        .into()
    }

    fn mount(store: &Rc<MemoryStore>) -> ColumnManager {
        ColumnManager::mount(
            GridId::new("people").unwrap(),
            columns(),
            ColumnPrefs::new(store.clone()),
        )
    }

    #[test]
    fn defaults_to_flagged_columns() {
        let store = Rc::new(MemoryStore::new());
        assert_eq!(mount(&store).visible_indices(), vec![0, 1]);
    }

    #[test]
    fn all_columns_when_none_flagged() {
        let columns: Rc<[ColumnDescriptor]> = vec![
            ColumnDescriptor::new("a", "A"),
            ColumnDescriptor::new("b", "B"),
        ]
        .into();
        let manager = ColumnManager::mount(
            GridId::new("g").unwrap(),
            columns,
            ColumnPrefs::new(Rc::new(MemoryStore::new())),
        );
        assert_eq!(manager.visible_indices(), vec![0, 1]);
    }

    #[test]
    fn stored_layout_wins_and_drops_out_of_range() {
        let store = Rc::new(MemoryStore::new());
        store.set("people", "[2, 3, 17]".into()).unwrap();
        assert_eq!(mount(&store).visible_indices(), vec![2, 3]);
    }

    #[test]
    fn empty_or_corrupt_layout_falls_back() {
        let store = Rc::new(MemoryStore::new());
        store.set("people", "[]".into()).unwrap();
        assert_eq!(mount(&store).visible_indices(), vec![0, 1]);
        store.set("people", "not json".into()).unwrap();
        assert_eq!(mount(&store).visible_indices(), vec![0, 1]);
    }

    #[test]
    fn visibility_changes_persist() {
        let store = Rc::new(MemoryStore::new());
        let mut manager = mount(&store);
        assert!(manager.toggle(3));
        assert!(manager.toggle(0));
        assert_eq!(store.get("people").as_deref(), Some("[1,3]"));
    }

    #[test]
    fn last_visible_column_stays() {
        let store = Rc::new(MemoryStore::new());
        let mut manager = mount(&store);
        assert!(manager.set_visible(0, false));
        assert!(!manager.set_visible(1, false));
        assert_eq!(manager.visible_indices(), vec![1]);
        assert!(!manager.set_visible(9, true));
    }

    #[test]
    fn order_and_visibility_are_independent() {
        let store = Rc::new(MemoryStore::new());
        let mut manager = mount(&store);
        assert!(manager.move_column(1, 0));
        assert_eq!(manager.order(), &[1, 0, 2, 3]);
        assert_eq!(manager.visible_indices(), vec![1, 0]);
        // Moving never writes storage.
        assert_eq!(store.get("people"), None);

        manager.toggle(2);
        assert_eq!(manager.order(), &[1, 0, 2, 3]);
        assert_eq!(manager.visible_indices(), vec![1, 0, 2]);
    }

    #[test]
    fn reset_restores_defaults() {
        let store = Rc::new(MemoryStore::new());
        let mut manager = mount(&store);
        manager.toggle(3);
        manager.move_column(3, 0);
        manager.reset();
        assert_eq!(manager.order(), &[0, 1, 2, 3]);
        assert_eq!(manager.visible_indices(), vec![0, 1]);
        assert_eq!(store.get("people"), None);
        assert_eq!(mount(&store).visible_indices(), vec![0, 1]);
    }
}
