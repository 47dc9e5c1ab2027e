//! Data model for the stateful data grid controller.
//!
//! Everything here is plain data shared by the history store, the
//! persistence layer and the controller itself:
//!
//! - `ids` - grid identifiers
//! - `query` - query state as a tagged union over filter modes
//! - `flat` - flat key/value codec used inside navigation entries
//! - `page` - fetched pages and their permissive backend form
//! - `column` - column declarations and quick-filter specs
//! - `request` - parameters handed to host fetch callbacks
//! - `row` - field access on displayed rows

pub mod column;
pub mod error;
pub mod flat;
pub mod ids;
pub mod page;
pub mod query;
pub mod request;
pub mod row;

pub use column::{
    ColumnDescriptor, FilterOption, QuickFilterSpec, first_sortable, validate_columns,
};
pub use error::{FetchError, ModelError, Result};
pub use flat::{FlatState, is_reserved_key};
pub use ids::{FALLBACK_GRID_ID, GridId};
pub use page::{Page, RawPage};
pub use query::{ActiveFilter, FilterMode, FilterSet, FilterValue, QueryState};
pub use request::{FetchPlan, FilterByRequest, ListRequest, SearchRequest};
pub use row::GridRow;
