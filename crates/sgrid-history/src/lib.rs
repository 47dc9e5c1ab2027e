//! Query state kept in navigation entries instead of the address bar.
//!
//! # Architecture
//!
//! - `adapter` - the [`NavigationStateAdapter`] seam plus an in-memory stack
//! - `store` - [`HistoryStore`], partitioned per grid, broadcasting changes
//! - `error` - write failures
//!
//! ```ignore
//! let store = HistoryStore::shared(MemoryNavigation::new());
//! let grid = GridId::new("distributors")?;
//!
//! store.set_state(&grid, &QueryState::default().with_page(2), WriteMode::Push)?;
//! store.back();
//! assert_eq!(store.get_state(&grid).page, 1);
//! ```

mod adapter;
mod error;
mod store;

pub use adapter::{MemoryNavigation, NavigationPayload, NavigationStateAdapter, WriteMode};
pub use error::{HistoryError, Result};
pub use store::{ChangeOrigin, HistoryStore, ScopedHistory, StateChange};
