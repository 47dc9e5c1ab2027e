//! Advanced filter panel draft.
//!
//! The panel edits a local copy of the filterBy fields and only writes them
//! on [`FilterPanel::apply`]. It listens to the history store directly, so a
//! change made elsewhere to the same grid shows up without the host wiring
//! anything through.

use std::cell::{Cell, RefCell};

use sgrid_history::StateChange;
use sgrid_model::{FilterSet, FilterValue, QueryState};
use tokio::sync::broadcast::{Receiver, error::TryRecvError};
use tracing::debug;

use crate::error::Result;
use crate::filter::FilterMachine;

/// Buffered filterBy editor bound to one grid.
#[derive(Debug)]
pub struct FilterPanel {
    machine: FilterMachine,
    changes: RefCell<Receiver<StateChange>>,
    draft: RefCell<FilterSet>,
    dirty: Cell<bool>,
}

impl FilterPanel {
    pub fn new(machine: FilterMachine, changes: Receiver<StateChange>) -> Self {
        let draft = draft_from(&machine.state());
        Self {
            machine,
            changes: RefCell::new(changes),
            draft: RefCell::new(draft),
            dirty: Cell::new(false),
        }
    }

    pub fn draft(&self) -> FilterSet {
        self.draft.borrow().clone()
    }

    /// Whether the draft has edits that were not applied yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn set_field(&self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.draft.borrow_mut().insert(key.into(), value.into());
        self.dirty.set(true);
    }

    pub fn remove_field(&self, key: &str) {
        if self.draft.borrow_mut().remove(key).is_some() {
            self.dirty.set(true);
        }
    }

    /// Write the draft as the grid's filterBy state.
    pub fn apply(&self) -> Result<QueryState> {
        let fields = self.draft();
        let state = self.machine.apply_filter_by(fields)?;
        self.reset_to(&state);
        Ok(state)
    }

    /// Clear every filter on the grid and empty the draft.
    pub fn clear(&self) -> Result<QueryState> {
        let state = self.machine.clear_all()?;
        self.reset_to(&state);
        Ok(state)
    }

    /// Discard unapplied edits.
    pub fn discard(&self) {
        self.reset_to(&self.machine.state());
    }

    /// Catch up with store notifications for this grid.
    ///
    /// Back/Forward restorations always overwrite the draft. Ordinary writes
    /// only do so when there are no unapplied edits.
    pub fn sync(&self) {
        let grid_id = self.machine.grid_id().clone();
        loop {
            let received = self.changes.borrow_mut().try_recv();
            match received {
                Ok(change) if change.grid_id == grid_id => {
                    if change.origin.is_pop_state() || !self.dirty.get() {
                        self.reset_to(&change.state);
                    }
                }
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(grid = %grid_id, skipped, "filter panel lagged, re-reading state");
                    if !self.dirty.get() {
                        self.reset_to(&self.machine.state());
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    fn reset_to(&self, state: &QueryState) {
        *self.draft.borrow_mut() = draft_from(state);
        self.dirty.set(false);
    }
}

fn draft_from(state: &QueryState) -> FilterSet {
    state.filter.filter_by_fields().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use sgrid_history::{HistoryStore, MemoryNavigation, ScopedHistory};
    use sgrid_model::{ColumnDescriptor, FilterMode, GridId};

    fn machine(store: &Rc<HistoryStore>, grid: &str) -> FilterMachine {
        let columns: Rc<[ColumnDescriptor]> = Vec::new().into();
        FilterMachine::new(
            ScopedHistory::new(Rc::clone(store), GridId::new(grid).unwrap()),
            columns,
        )
    }

    fn panel(store: &Rc<HistoryStore>) -> FilterPanel {
        FilterPanel::new(machine(store, "assets"), store.subscribe())
    }

    #[test]
    fn apply_writes_filter_by_state() {
        let store = HistoryStore::shared(MemoryNavigation::new());
        let panel = panel(&store);
        panel.set_field("owner", "ops");
        assert!(panel.is_dirty());

        let state = panel.apply().unwrap();
        assert_eq!(state.mode(), FilterMode::FilterBy);
        assert!(!panel.is_dirty());
        assert_eq!(panel.draft().len(), 1);
    }

    #[test]
    fn clean_draft_follows_other_writers() {
        let store = HistoryStore::shared(MemoryNavigation::new());
        let panel = panel(&store);
        let other = machine(&store, "assets");
        let mut fields = FilterSet::new();
        fields.insert("city".into(), "Oslo".into());
        other.apply_filter_by(fields.clone()).unwrap();

        panel.sync();
        assert_eq!(panel.draft(), fields);
    }

    #[test]
    fn dirty_draft_survives_writes_but_not_pop_state() {
        let store = HistoryStore::shared(MemoryNavigation::new());
        let other = machine(&store, "assets");
        other.go_to_page(2).unwrap();

        let panel = panel(&store);
        panel.set_field("owner", "hr");
        other.submit_search("acme").unwrap();
        panel.sync();
        assert_eq!(panel.draft().get("owner"), Some(&FilterValue::from("hr")));

        assert!(store.back());
        panel.sync();
        assert!(panel.draft().is_empty());
        assert!(!panel.is_dirty());
    }

    #[test]
    fn other_grids_are_ignored() {
        let store = HistoryStore::shared(MemoryNavigation::new());
        let panel = panel(&store);
        let mut fields = FilterSet::new();
        fields.insert("city".into(), "Oslo".into());
        machine(&store, "orders").apply_filter_by(fields).unwrap();
        panel.sync();
        assert!(panel.draft().is_empty());
    }
}
