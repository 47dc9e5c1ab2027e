//! Durable storage for data grid preferences.
//!
//! # Features
//!
//! - **Local-storage semantics**: string keys and values behind [`DurableStore`]
//! - **Atomic writes** for the file-backed store
//! - **Corruption tolerance**: unreadable entries are reported, never fatal
//!
//! # Architecture
//!
//! - `store.rs` - the [`DurableStore`] trait, memory and file implementations
//! - `layout.rs` - visible-column codec keyed by grid identifier
//! - `error.rs` - error types with user-friendly messages

mod error;
mod layout;
mod store;

pub use error::{PersistenceError, Result};
pub use layout::{ColumnPrefs, StoredLayout};
pub use store::{DEFAULT_FILE_NAME, DurableStore, FileStore, MemoryStore};
