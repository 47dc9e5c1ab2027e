//! The data grid controller.
//!
//! [`DataGrid`] wires the pieces together for one grid instance: the filter
//! machine writes query state into the history store, the store's change
//! notifications drive the orchestrator, and fetched pages feed the column,
//! selection and sort state the host renders.
//!
//! Every method takes `&self`. Synchronous mutators only touch state; the
//! host then awaits [`DataGrid::sync`] to fetch whatever the change requires.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use sgrid_history::{HistoryStore, ScopedHistory, StateChange};
use sgrid_model::{
    ColumnDescriptor, FilterMode, FilterSet, FilterValue, GridId, GridRow, Page, QueryState,
    validate_columns,
};
use sgrid_persistence::{ColumnPrefs, DurableStore};
use tokio::sync::broadcast::{Receiver, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::columns::ColumnManager;
use crate::error::{GridError, Result};
use crate::filter::FilterMachine;
use crate::orchestrator::{Outcome, QueryOrchestrator};
use crate::panel::FilterPanel;
use crate::selection::{SelectAllState, SelectionSet};
use crate::settings::GridSettings;
use crate::sort::{SortDirection, SortState};
use crate::source::GridSource;

type SelectionCallback = Box<dyn Fn(&[usize])>;

// =============================================================================
// BUILDER
// =============================================================================

/// Collects a grid's configuration before mounting it.
pub struct DataGridBuilder<R> {
    grid_id: Option<String>,
    columns: Vec<ColumnDescriptor>,
    source: GridSource<R>,
    settings: GridSettings,
    history: Rc<HistoryStore>,
    storage: Rc<dyn DurableStore>,
    on_selection_change: Option<SelectionCallback>,
}

impl<R: GridRow + Clone + 'static> DataGridBuilder<R> {
    pub fn grid_id(mut self, grid_id: impl Into<String>) -> Self {
        self.grid_id = Some(grid_id.into());
        self
    }

    pub fn columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = columns;
        self
    }

    pub fn source(mut self, source: GridSource<R>) -> Self {
        self.source = source;
        self
    }

    pub fn settings(mut self, settings: GridSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn on_selection_change(mut self, callback: impl Fn(&[usize]) + 'static) -> Self {
        self.on_selection_change = Some(Box::new(callback));
        self
    }

    /// Validate the configuration and mount the grid.
    ///
    /// Restores the column layout from storage but fetches nothing; call
    /// [`DataGrid::load`] for the first page.
    pub fn mount(self) -> Result<DataGrid<R>> {
        validate_columns(&self.columns)?;
        self.source.validate()?;

        let grid_id = match self.grid_id.as_deref().map(GridId::new) {
            Some(Ok(grid_id)) => grid_id,
            Some(Err(error)) => {
                warn!(%error, fallback = %self.settings.fallback_grid_id, "invalid grid id");
                fallback_grid_id(&self.settings)?
            }
            None => {
                warn!(
                    fallback = %self.settings.fallback_grid_id,
                    "grid mounted without an id; state may collide with other grids"
                );
                fallback_grid_id(&self.settings)?
            }
        };

        let columns: Rc<[ColumnDescriptor]> = self.columns.into();
        let mut source = self.source;
        source.set_search_keys(columns.iter().map(|c| c.key.clone()).collect());
        let (search, filter_by) = (source.has_search(), source.has_filter_by());

        let history = ScopedHistory::new(self.history, grid_id.clone());
        let changes = history.subscribe();
        let machine = FilterMachine::new(history.clone(), Rc::clone(&columns));
        let layout = ColumnManager::mount(
            grid_id.clone(),
            Rc::clone(&columns),
            ColumnPrefs::new(self.storage),
        );
        let orchestrator = QueryOrchestrator::new(grid_id.clone(), source, self.settings);

        info!(
            grid = %grid_id,
            columns = columns.len(),
            search,
            filter_by,
            "grid mounted"
        );
        Ok(DataGrid {
            grid_id,
            columns,
            history,
            machine,
            orchestrator,
            changes: RefCell::new(changes),
            layout: RefCell::new(layout),
            selection: RefCell::new(SelectionSet::new()),
            sort: RefCell::new(SortState::default()),
            refresh_key: Cell::new(0),
            on_selection_change: self.on_selection_change,
        })
    }
}

fn fallback_grid_id(settings: &GridSettings) -> Result<GridId> {
    GridId::new(settings.fallback_grid_id.as_str())
        .map_err(|error| GridError::Configuration(error.to_string()))
}

// =============================================================================
// DISPLAYED PAGE
// =============================================================================

/// The current page in display (sorted) order.
#[derive(Debug, Clone)]
pub struct DisplayedPage<R> {
    page: Rc<Page<R>>,
    order: Vec<usize>,
}

impl<R> DisplayedPage<R> {
    pub fn page(&self) -> &Page<R> {
        &self.page
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Row at display position `index`.
    pub fn row(&self, index: usize) -> Option<&R> {
        self.order.get(index).map(|&i| &self.page.rows[i])
    }

    pub fn rows(&self) -> impl Iterator<Item = &R> {
        self.order.iter().map(|&i| &self.page.rows[i])
    }
}

// =============================================================================
// GRID
// =============================================================================

/// One mounted grid.
pub struct DataGrid<R> {
    grid_id: GridId,
    columns: Rc<[ColumnDescriptor]>,
    history: ScopedHistory,
    machine: FilterMachine,
    orchestrator: QueryOrchestrator<R>,
    changes: RefCell<Receiver<StateChange>>,
    layout: RefCell<ColumnManager>,
    selection: RefCell<SelectionSet>,
    sort: RefCell<SortState>,
    refresh_key: Cell<u64>,
    on_selection_change: Option<SelectionCallback>,
}

impl<R> std::fmt::Debug for DataGrid<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("grid_id", &self.grid_id)
            .field("columns", &self.columns.len())
            .field("refresh_key", &self.refresh_key.get())
            .finish_non_exhaustive()
    }
}

impl<R> Drop for DataGrid<R> {
    fn drop(&mut self) {
        self.history.store().unregister(&self.grid_id);
    }
}

impl<R: GridRow + Clone + 'static> DataGrid<R> {
    /// Start configuring a grid against a shared history store and durable
    /// storage.
    pub fn builder(history: Rc<HistoryStore>, storage: Rc<dyn DurableStore>) -> DataGridBuilder<R> {
        DataGridBuilder {
            grid_id: None,
            columns: Vec::new(),
            source: GridSource::new(),
            settings: GridSettings::default(),
            history,
            storage,
            on_selection_change: None,
        }
    }

    pub fn grid_id(&self) -> &GridId {
        &self.grid_id
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Current query state from the history store.
    pub fn state(&self) -> QueryState {
        self.history.get()
    }

    pub fn mode(&self) -> FilterMode {
        self.state().mode()
    }

    pub fn page(&self) -> Rc<Page<R>> {
        self.orchestrator.page()
    }

    pub fn is_loading(&self) -> bool {
        self.orchestrator.is_loading()
    }

    /// Number of explicit refreshes requested so far.
    pub fn refresh_key(&self) -> u64 {
        self.refresh_key.get()
    }

    /// A filter panel bound to this grid.
    pub fn filter_panel(&self) -> FilterPanel {
        FilterPanel::new(self.machine.clone(), self.history.subscribe())
    }

    // -------------------------------------------------------------------------
    // Fetching
    // -------------------------------------------------------------------------

    /// Fetch the page for the current state (mount-time load).
    pub async fn load(&self) -> Result<Outcome> {
        self.drain_changes();
        self.fetch(false).await
    }

    /// Fetch if the store reported a change to this grid since the last call.
    ///
    /// Returns `None` when nothing changed.
    pub async fn sync(&self) -> Result<Option<Outcome>> {
        if !self.drain_changes() {
            return Ok(None);
        }
        self.fetch(false).await.map(Some)
    }

    /// Refetch the current state even if it matches the last request.
    pub async fn refresh(&self) -> Result<Outcome> {
        self.drain_changes();
        self.refresh_key.set(self.refresh_key.get() + 1);
        debug!(grid = %self.grid_id, refresh_key = self.refresh_key.get(), "refresh requested");
        self.fetch(true).await
    }

    /// Clear every filter and show the last unfiltered page straight away,
    /// then refetch it.
    pub async fn restore_unfiltered(&self) -> Result<Outcome> {
        self.machine.clear_all()?;
        self.drain_changes();
        if self.orchestrator.restore_unfiltered() {
            self.page_replaced();
        }
        self.fetch(false).await
    }

    async fn fetch(&self, force: bool) -> Result<Outcome> {
        let state = self.state();
        let outcome = self.orchestrator.submit(&state, force).await?;
        if outcome.is_applied() {
            self.page_replaced();
        }
        Ok(outcome)
    }

    /// Returns true when any notification concerned this grid.
    fn drain_changes(&self) -> bool {
        let mut relevant = false;
        loop {
            let received = self.changes.borrow_mut().try_recv();
            match received {
                Ok(change) => relevant |= change.grid_id == self.grid_id,
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(grid = %self.grid_id, skipped, "change feed lagged");
                    relevant = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return relevant,
            }
        }
    }

    fn page_replaced(&self) {
        let has_rows = !self.orchestrator.page().is_empty();
        self.sort.borrow_mut().auto_select(&self.columns, has_rows);
        self.clear_selection();
    }

    // -------------------------------------------------------------------------
    // Filters and paging
    // -------------------------------------------------------------------------

    pub fn submit_search(&self, term: &str) -> Result<QueryState> {
        self.machine.submit_search(term)
    }

    pub fn apply_filter_by(&self, fields: FilterSet) -> Result<QueryState> {
        self.machine.apply_filter_by(fields)
    }

    pub fn set_quick_filter(&self, key: &str, value: Option<FilterValue>) -> Result<QueryState> {
        self.machine.set_quick_filter(key, value)
    }

    pub fn toggle_quick_option(&self, key: &str, option: &str) -> Result<QueryState> {
        self.machine.toggle_quick_option(key, option)
    }

    pub fn clear_filters(&self) -> Result<QueryState> {
        self.machine.clear_all()
    }

    pub fn go_to_page(&self, page: u32) -> Result<QueryState> {
        self.machine.go_to_page(page)
    }

    pub fn set_page_size(&self, page_size: u32) -> Result<QueryState> {
        self.machine.set_page_size(page_size)
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Sort the displayed page by column `key`.
    ///
    /// Re-sorting changes what each displayed index points at, so the
    /// selection is cleared.
    pub fn sort_by(&self, key: &str) -> bool {
        let changed = self.sort.borrow_mut().select(&self.columns, key);
        if changed {
            self.clear_selection();
        }
        changed
    }

    pub fn sort_state(&self) -> (Option<String>, SortDirection) {
        let sort = self.sort.borrow();
        (sort.column().map(str::to_string), sort.direction())
    }

    pub fn displayed(&self) -> DisplayedPage<R> {
        let page = self.orchestrator.page();
        let order = self.sort.borrow().order(&page.rows);
        DisplayedPage { page, order }
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn toggle_row(&self, index: usize) -> bool {
        let rows = self.orchestrator.page().len();
        let changed = self.selection.borrow_mut().toggle(index, rows);
        if changed {
            self.notify_selection();
        }
        changed
    }

    pub fn toggle_all(&self) {
        let rows = self.orchestrator.page().len();
        self.selection.borrow_mut().toggle_all(rows);
        self.notify_selection();
    }

    pub fn select_all_state(&self) -> SelectAllState {
        self.selection
            .borrow()
            .state(self.orchestrator.page().len())
    }

    /// Selected display indices.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selection.borrow().indices()
    }

    /// Selected rows, in display order.
    pub fn selected_rows(&self) -> Vec<R> {
        let displayed = self.displayed();
        let rows: Vec<&R> = displayed.rows().collect();
        self.selection
            .borrow()
            .resolve(&rows)
            .into_iter()
            .copied()
            .cloned()
            .collect()
    }

    fn clear_selection(&self) {
        let cleared = self.selection.borrow_mut().clear();
        if cleared {
            self.notify_selection();
        }
    }

    fn notify_selection(&self) {
        if let Some(callback) = &self.on_selection_change {
            let indices = self.selection.borrow().indices();
            callback(&indices);
        }
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    pub fn is_column_visible(&self, index: usize) -> bool {
        self.layout.borrow().is_visible(index)
    }

    pub fn toggle_column(&self, index: usize) -> bool {
        self.layout.borrow_mut().toggle(index)
    }

    pub fn set_column_visible(&self, index: usize, show: bool) -> bool {
        self.layout.borrow_mut().set_visible(index, show)
    }

    /// Show or hide a column by key.
    pub fn set_column_visible_by_key(&self, key: &str, show: bool) -> bool {
        let index = self.layout.borrow().index_of(key);
        match index {
            Some(index) => self.set_column_visible(index, show),
            None => {
                warn!(grid = %self.grid_id, column = key, "unknown column");
                false
            }
        }
    }

    pub fn move_column(&self, from: usize, to: usize) -> bool {
        self.layout.borrow_mut().move_column(from, to)
    }

    pub fn reset_columns(&self) {
        self.layout.borrow_mut().reset();
    }

    pub fn column_order(&self) -> Vec<usize> {
        self.layout.borrow().order().to_vec()
    }

    /// Visible column indices in display order.
    pub fn visible_column_indices(&self) -> Vec<usize> {
        self.layout.borrow().visible_indices()
    }

    /// Visible columns in display order.
    pub fn visible_columns(&self) -> Vec<ColumnDescriptor> {
        self.layout
            .borrow()
            .visible_columns()
            .into_iter()
            .cloned()
            .collect()
    }
}
