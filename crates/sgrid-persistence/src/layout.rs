//! Visible-column persistence.
//!
//! Each grid stores its visible column indices as a JSON array under its
//! grid identifier, e.g. `"distributors" -> "[0,1,4]"`.

use std::rc::Rc;

use sgrid_model::GridId;
use tracing::{info, warn};

use crate::error::{PersistenceError, Result};
use crate::store::DurableStore;

/// What durable storage holds for one grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredLayout {
    /// Nothing stored yet.
    Missing,
    /// An entry exists but does not parse as an index list.
    Corrupt,
    /// A parsed list of visible column indices (may be empty).
    Visible(Vec<usize>),
}

/// Reads and writes persisted column visibility.
#[derive(Clone)]
pub struct ColumnPrefs {
    store: Rc<dyn DurableStore>,
}

impl std::fmt::Debug for ColumnPrefs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnPrefs").finish_non_exhaustive()
    }
}

impl ColumnPrefs {
    pub fn new(store: Rc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// Load the stored entry for `grid_id`.
    pub fn load(&self, grid_id: &GridId) -> StoredLayout {
        let Some(raw) = self.store.get(grid_id.as_str()) else {
            return StoredLayout::Missing;
        };
        match serde_json::from_str::<Vec<usize>>(&raw) {
            Ok(indices) => StoredLayout::Visible(indices),
            Err(error) => {
                warn!(grid = %grid_id, %error, "stored column layout is corrupt");
                StoredLayout::Corrupt
            }
        }
    }

    /// Persist the visible column indices for `grid_id`.
    pub fn save(&self, grid_id: &GridId, visible: &[usize]) -> Result<()> {
        let encoded = serde_json::to_string(visible)
            .map_err(|source| PersistenceError::Serialization { source })?;
        self.store.set(grid_id.as_str(), encoded)?;
        info!(grid = %grid_id, columns = visible.len(), "column layout saved");
        Ok(())
    }

    /// Forget the stored layout for `grid_id`.
    pub fn clear(&self, grid_id: &GridId) -> Result<()> {
        self.store.remove(grid_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn grid(name: &str) -> GridId {
        GridId::new(name).unwrap()
    }

    #[test]
    fn missing_and_corrupt_entries() {
        let store = Rc::new(MemoryStore::new());
        let prefs = ColumnPrefs::new(store.clone());
        assert_eq!(prefs.load(&grid("g")), StoredLayout::Missing);

        store.set("g", "[1, \"two\"]".into()).unwrap();
        assert_eq!(prefs.load(&grid("g")), StoredLayout::Corrupt);
    }

    #[test]
    fn save_then_load() {
        let prefs = ColumnPrefs::new(Rc::new(MemoryStore::new()));
        prefs.save(&grid("g"), &[0, 3]).unwrap();
        assert_eq!(prefs.load(&grid("g")), StoredLayout::Visible(vec![0, 3]));
        prefs.clear(&grid("g")).unwrap();
        assert_eq!(prefs.load(&grid("g")), StoredLayout::Missing);
    }
}
