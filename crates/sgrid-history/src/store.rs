//! History-backed query state store.
//!
//! One store serves the whole application. Each navigation entry carries the
//! query state of every grid that was active when the entry was written, so
//! Back/Forward restores exactly what each grid was showing without any of it
//! appearing in the address bar.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use sgrid_model::{GridId, QueryState, flat};
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::adapter::{NavigationPayload, NavigationStateAdapter, WriteMode};
use crate::error::{HistoryError, Result};

/// Capacity of the change channel; slow subscribers past this re-read state.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Where a state change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Written by `set_state`.
    Write(WriteMode),
    /// Restored from a Back/Forward traversal.
    PopState,
}

impl ChangeOrigin {
    pub fn is_pop_state(&self) -> bool {
        matches!(self, Self::PopState)
    }
}

/// Notification emitted for every state change of one grid.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    pub grid_id: GridId,
    pub state: QueryState,
    pub origin: ChangeOrigin,
}

/// Query state store persisted in navigation entries.
pub struct HistoryStore {
    adapter: RefCell<Box<dyn NavigationStateAdapter>>,
    /// Mounted grids. A traversal to an entry written before one of them
    /// existed still resets it; unmounted grids are dropped from the set.
    known: RefCell<BTreeSet<GridId>>,
    changes: broadcast::Sender<StateChange>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("known", &self.known.borrow())
            .finish_non_exhaustive()
    }
}

impl HistoryStore {
    pub fn new(adapter: impl NavigationStateAdapter + 'static) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            adapter: RefCell::new(Box::new(adapter)),
            known: RefCell::new(BTreeSet::new()),
            changes,
        }
    }

    /// Convenience constructor for shared ownership.
    pub fn shared(adapter: impl NavigationStateAdapter + 'static) -> Rc<Self> {
        Rc::new(Self::new(adapter))
    }

    /// Subscribe to state changes of every grid.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    /// Start delivering pop-state restorations to `grid_id`.
    pub fn register(&self, grid_id: &GridId) {
        if self.known.borrow_mut().insert(grid_id.clone()) {
            trace!(grid = %grid_id, "grid registered with history store");
        }
    }

    /// Stop delivering pop-state restorations to `grid_id`.
    ///
    /// Its state stays in the navigation entries, so remounting under the
    /// same id picks it up again.
    pub fn unregister(&self, grid_id: &GridId) -> bool {
        let removed = self.known.borrow_mut().remove(grid_id);
        if removed {
            debug!(grid = %grid_id, "grid unregistered from history store");
        }
        removed
    }

    /// Current query state of `grid_id` (default when the entry has none).
    pub fn get_state(&self, grid_id: &GridId) -> QueryState {
        self.known.borrow_mut().insert(grid_id.clone());
        let payload = self.adapter.borrow().read();
        payload
            .get(grid_id.as_str())
            .map(flat::decode_value)
            .unwrap_or_default()
    }

    /// Replace the state of `grid_id` in the navigation stack.
    ///
    /// Reads the current entry, swaps in this grid's state and leaves every
    /// other grid's state as it was. Writing a state identical to the current
    /// one is a no-op and emits nothing.
    pub fn set_state(&self, grid_id: &GridId, next: &QueryState, mode: WriteMode) -> Result<()> {
        self.known.borrow_mut().insert(grid_id.clone());

        let mut payload = self.adapter.borrow().read();
        let current = payload
            .get(grid_id.as_str())
            .map(flat::decode_value)
            .unwrap_or_default();
        if current == *next && payload.contains_key(grid_id.as_str()) {
            trace!(grid = %grid_id, "query state unchanged, skipping history write");
            return Ok(());
        }

        let encoded = serde_json::to_value(next).map_err(|source| HistoryError::Encode {
            grid_id: grid_id.to_string(),
            source,
        })?;
        payload.insert(grid_id.to_string(), encoded);
        self.adapter.borrow_mut().write(payload, mode)?;

        debug!(
            grid = %grid_id,
            mode = mode.as_str(),
            filter_mode = %next.mode(),
            page = next.page,
            "query state written"
        );
        self.emit(StateChange {
            grid_id: grid_id.clone(),
            state: next.clone(),
            origin: ChangeOrigin::Write(mode),
        });
        Ok(())
    }

    /// Go one entry back. Returns false when there is nothing to go back to.
    pub fn back(&self) -> bool {
        self.go(-1)
    }

    /// Go one entry forward. Returns false at the end of the stack.
    pub fn forward(&self) -> bool {
        self.go(1)
    }

    /// Traverse `delta` entries and republish the restored states.
    pub fn go(&self, delta: isize) -> bool {
        let restored = self.adapter.borrow_mut().traverse(delta);
        match restored {
            Some(payload) => {
                self.handle_pop_state(&payload);
                true
            }
            None => false,
        }
    }

    /// Republish every registered grid's state from a traversed entry.
    ///
    /// Browser-backed hosts call this from their pop-state listener. The
    /// restored state is authoritative: subscribers drop whatever they had
    /// buffered locally. Entries for grids that are not registered stay in
    /// the payload but are not announced.
    pub fn handle_pop_state(&self, payload: &NavigationPayload) {
        let grids: BTreeSet<GridId> = self.known.borrow().clone();

        debug!(grids = grids.len(), "restoring query state from navigation entry");
        for grid_id in grids {
            let state = payload
                .get(grid_id.as_str())
                .map(flat::decode_value)
                .unwrap_or_default();
            self.emit(StateChange {
                grid_id,
                state,
                origin: ChangeOrigin::PopState,
            });
        }
    }

    fn emit(&self, change: StateChange) {
        // No subscribers is fine; nobody is mounted yet.
        let _ = self.changes.send(change);
    }
}

/// Store handle bound to one grid.
#[derive(Debug, Clone)]
pub struct ScopedHistory {
    store: Rc<HistoryStore>,
    grid_id: GridId,
}

impl ScopedHistory {
    /// Bind to `grid_id`, registering it for pop-state restorations.
    pub fn new(store: Rc<HistoryStore>, grid_id: GridId) -> Self {
        store.register(&grid_id);
        Self { store, grid_id }
    }

    pub fn grid_id(&self) -> &GridId {
        &self.grid_id
    }

    pub fn store(&self) -> &Rc<HistoryStore> {
        &self.store
    }

    pub fn get(&self) -> QueryState {
        self.store.get_state(&self.grid_id)
    }

    pub fn set(&self, next: &QueryState, mode: WriteMode) -> Result<()> {
        self.store.set_state(&self.grid_id, next, mode)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.store.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MemoryNavigation;

    fn grid(name: &str) -> GridId {
        GridId::new(name).unwrap()
    }

    #[test]
    fn unknown_grid_reads_default() {
        let store = HistoryStore::new(MemoryNavigation::new());
        assert_eq!(store.get_state(&grid("g")), QueryState::default());
    }

    #[test]
    fn identical_write_emits_nothing() {
        let store = HistoryStore::new(MemoryNavigation::new());
        let mut rx = store.subscribe();
        let state = QueryState::default().with_page(2);

        store.set_state(&grid("g"), &state, WriteMode::Push).unwrap();
        store.set_state(&grid("g"), &state, WriteMode::Push).unwrap();

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn back_past_first_entry_is_refused() {
        let store = HistoryStore::new(MemoryNavigation::new());
        assert!(!store.back());
        assert!(!store.forward());
    }
}
