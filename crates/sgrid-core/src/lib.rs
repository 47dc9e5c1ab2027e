//! Stateful data grid controller.
//!
//! Reconciles paging, search, advanced filtering, quick filters, column
//! layout, selection and sorting for grids whose query state lives in the
//! navigation history.
//!
//! # Architecture
//!
//! - `filter` - filter-mode state machine writing to the history store
//! - `orchestrator` - debounced, de-duplicated fetching with stale discard
//! - `source` - host fetch callbacks or an in-memory dataset
//! - `columns` / `selection` / `sort` - client-side state over the page
//! - `panel` - buffered advanced-filter draft
//! - `grid` - [`DataGrid`], the composition root
//! - `settings` - timing and paging defaults
//!
//! ```ignore
//! let history = HistoryStore::shared(MemoryNavigation::new());
//! let storage = Rc::new(MemoryStore::new());
//! let grid = DataGrid::builder(history, storage)
//!     .grid_id("distributors")
//!     .columns(columns)
//!     .source(GridSource::remote(fetch_distributors))
//!     .mount()?;
//!
//! grid.load().await?;
//! grid.submit_search("acme")?;
//! grid.sync().await?;
//! ```

pub mod columns;
pub mod error;
pub mod filter;
pub mod grid;
pub mod orchestrator;
pub mod panel;
pub mod schedule;
pub mod selection;
pub mod settings;
pub mod sort;
pub mod source;

pub use columns::ColumnManager;
pub use error::{GridError, Result};
pub use filter::FilterMachine;
pub use grid::{DataGrid, DataGridBuilder, DisplayedPage};
pub use orchestrator::{Outcome, QueryOrchestrator};
pub use panel::FilterPanel;
pub use schedule::{DebounceHandle, Debouncer};
pub use selection::{SelectAllState, SelectionSet};
pub use settings::GridSettings;
pub use sort::{SortDirection, SortState, natural_cmp, sort_order};
pub use source::{FetchFuture, GridSource, StaticSource};
