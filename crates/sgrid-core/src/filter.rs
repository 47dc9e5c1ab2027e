//! Filter-mode state machine.
//!
//! Three filtering strategies compete for a grid: per-column quick filters,
//! free-text search and the advanced filter panel. Each maps to a different
//! backend endpoint with its own parameter shape, so only one may be active.
//! Every transition here goes through the history store and lands the grid
//! back on page 1.
//!
//! ```text
//!            search(term)            filter_by(fields)
//!   none ───────────────► search ─────────────────────► filterBy
//!    │ ▲                    │                              │
//!    │ └──── clear_all ◄────┴──────────────────────────────┤
//!    │                                                     │
//!    └── quick filter ──► list ◄──── quick filter ─────────┘
//!                         └─┘ quick filter (merged)
//! ```

use std::rc::Rc;

use sgrid_history::{ScopedHistory, WriteMode};
use sgrid_model::{
    ActiveFilter, ColumnDescriptor, FilterMode, FilterSet, FilterValue, GridId, QueryState,
    is_reserved_key,
};
use tracing::{debug, warn};

use crate::error::Result;

/// Applies filter transitions for one grid.
#[derive(Debug, Clone)]
pub struct FilterMachine {
    history: ScopedHistory,
    columns: Rc<[ColumnDescriptor]>,
}

impl FilterMachine {
    pub fn new(history: ScopedHistory, columns: Rc<[ColumnDescriptor]>) -> Self {
        Self { history, columns }
    }

    pub fn grid_id(&self) -> &GridId {
        self.history.grid_id()
    }

    /// Current query state.
    pub fn state(&self) -> QueryState {
        self.history.get()
    }

    pub fn mode(&self) -> FilterMode {
        self.state().mode()
    }

    /// Enter search mode with `term`, dropping quick and panel filters.
    ///
    /// A blank term clears every filter instead.
    pub fn submit_search(&self, term: &str) -> Result<QueryState> {
        let term = term.trim();
        if term.is_empty() {
            return self.clear_all();
        }
        self.transition(ActiveFilter::Search {
            term: term.to_string(),
        })
    }

    /// Enter filterBy mode with exactly `fields`.
    ///
    /// Empty values are dropped; if nothing remains every filter is cleared.
    pub fn apply_filter_by(&self, fields: FilterSet) -> Result<QueryState> {
        let fields = self.sanitize(fields);
        if fields.is_empty() {
            return self.clear_all();
        }
        self.transition(ActiveFilter::FilterBy { fields })
    }

    /// Set (`Some`) or remove (`None`) one quick filter.
    ///
    /// In list mode the key merges with the quick filters already applied.
    /// From any other mode the grid switches to list mode with only this key.
    /// Removing a key that is not applied changes nothing.
    pub fn set_quick_filter(&self, key: &str, value: Option<FilterValue>) -> Result<QueryState> {
        if is_reserved_key(key) {
            warn!(grid = %self.history.grid_id(), key, "ignoring quick filter on reserved key");
            return Ok(self.state());
        }
        self.flag_unexposed_column(key);

        let current = self.state();
        let mut quick_filters = match &current.filter {
            ActiveFilter::List { quick_filters } => quick_filters.clone(),
            _ => FilterSet::new(),
        };
        match value.filter(|v| !v.is_empty()) {
            Some(value) => {
                quick_filters.insert(key.to_string(), value);
            }
            None => {
                if quick_filters.remove(key).is_none() {
                    // Nothing to remove; leave the current mode alone.
                    return Ok(current);
                }
            }
        }

        if quick_filters.is_empty() {
            return self.transition(ActiveFilter::None);
        }
        self.transition(ActiveFilter::List { quick_filters })
    }

    /// Pick `option` in a column's quick filter.
    ///
    /// Single-select columns replace their value (picking the same value
    /// again removes it); multi-select columns toggle membership.
    pub fn toggle_quick_option(&self, key: &str, option: &str) -> Result<QueryState> {
        let is_single = self
            .column(key)
            .and_then(|c| c.filter.as_ref())
            .is_none_or(|spec| spec.is_single);
        let current = self
            .state()
            .filter
            .quick_filters()
            .and_then(|filters| filters.get(key).cloned());

        let next = if is_single {
            match current {
                Some(value) if value.matches(option) => None,
                _ => Some(FilterValue::Text(option.to_string())),
            }
        } else {
            let mut values = match current {
                Some(FilterValue::Many(values)) => values,
                Some(other) => vec![other.to_string()],
                None => Vec::new(),
            };
            let picked = option.trim();
            if let Some(position) = values
                .iter()
                .position(|v| v.trim().eq_ignore_ascii_case(picked))
            {
                values.remove(position);
            } else {
                values.push(option.to_string());
            }
            Some(FilterValue::Many(values))
        };
        self.set_quick_filter(key, next)
    }

    /// Return to mode `none`, keeping the page size.
    pub fn clear_all(&self) -> Result<QueryState> {
        self.transition(ActiveFilter::None)
    }

    /// Navigate to `page`, creating a Back entry.
    pub fn go_to_page(&self, page: u32) -> Result<QueryState> {
        let next = self.state().with_page(page);
        self.history.set(&next, WriteMode::Push)?;
        Ok(next)
    }

    /// Change rows per page, returning to page 1.
    pub fn set_page_size(&self, page_size: u32) -> Result<QueryState> {
        let next = self.state().with_page_size(page_size);
        self.history.set(&next, WriteMode::Replace)?;
        Ok(next)
    }

    fn transition(&self, filter: ActiveFilter) -> Result<QueryState> {
        let current = self.state();
        let next = current.with_filter(filter);
        debug!(
            grid = %self.history.grid_id(),
            from = %current.mode(),
            to = %next.mode(),
            "filter transition"
        );
        self.history.set(&next, WriteMode::Replace)?;
        Ok(next)
    }

    fn sanitize(&self, fields: FilterSet) -> FilterSet {
        fields
            .into_iter()
            .filter(|(key, value)| {
                if is_reserved_key(key) {
                    warn!(grid = %self.history.grid_id(), key = %key, "dropping reserved filter key");
                    return false;
                }
                !value.is_empty()
            })
            .collect()
    }

    fn column(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Quick filters on columns the host never offered a filter for are
    /// accepted, but they widen what the UI can show as active.
    fn flag_unexposed_column(&self, key: &str) {
        match self.column(key) {
            Some(column) if column.filter.is_some() => {}
            Some(_) => warn!(
                grid = %self.history.grid_id(),
                column = key,
                "quick filter on a column without a filter control"
            ),
            None => warn!(
                grid = %self.history.grid_id(),
                column = key,
                "quick filter on an undeclared column"
            ),
        }
    }
}
