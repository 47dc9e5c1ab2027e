//! Turns query states into pages.
//!
//! The orchestrator sits between the history store and the fetch callbacks.
//! It skips fetches whose request would be identical to the last one,
//! debounces bursts of changes, keeps the loading indicator up for a minimum
//! time and throws away responses that arrive after a newer request was sent.

use std::cell::RefCell;
use std::rc::Rc;

use sgrid_model::{FetchPlan, FilterMode, GridId, GridRow, Page, QueryState};
use tracing::{debug, info, warn};

use crate::error::{GridError, Result};
use crate::schedule::Debouncer;
use crate::settings::GridSettings;
use crate::source::GridSource;

/// What happened to one submitted query state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A fetch completed and its page is now displayed.
    Applied,
    /// Same request as the last dispatched one; nothing was fetched.
    Duplicate,
    /// A newer submission arrived during the debounce window.
    Superseded,
    /// The response arrived after a newer request was dispatched.
    Stale,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug)]
struct FetchState<R> {
    page: Rc<Page<R>>,
    /// Last page fetched with no filter active.
    unfiltered: Option<Rc<Page<R>>>,
    last_plan: Option<FetchPlan>,
    next_request_id: u64,
    latest_request_id: u64,
    loading: bool,
}

/// Fetch coordinator for one grid.
#[derive(Debug)]
pub struct QueryOrchestrator<R> {
    grid_id: GridId,
    source: GridSource<R>,
    settings: GridSettings,
    debouncer: Debouncer,
    state: RefCell<FetchState<R>>,
}

impl<R: GridRow + Clone + 'static> QueryOrchestrator<R> {
    pub fn new(grid_id: GridId, source: GridSource<R>, settings: GridSettings) -> Self {
        let debouncer = Debouncer::new(settings.debounce());
        let page = Rc::new(Page::empty(settings.page_size()));
        Self {
            grid_id,
            source,
            settings,
            debouncer,
            state: RefCell::new(FetchState {
                page,
                unfiltered: None,
                last_plan: None,
                next_request_id: 0,
                latest_request_id: 0,
                loading: false,
            }),
        }
    }

    /// Currently displayed page.
    pub fn page(&self) -> Rc<Page<R>> {
        Rc::clone(&self.state.borrow().page)
    }

    /// Last page fetched while no filter was active.
    pub fn unfiltered(&self) -> Option<Rc<Page<R>>> {
        self.state.borrow().unfiltered.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Request that would be sent for `state`.
    pub fn plan_for(&self, state: &QueryState) -> FetchPlan {
        FetchPlan::for_state(state, self.settings.page_size())
    }

    /// Show the unfiltered snapshot right away. Returns false if none exists.
    pub fn restore_unfiltered(&self) -> bool {
        let mut state = self.state.borrow_mut();
        match state.unfiltered.clone() {
            Some(snapshot) => {
                debug!(grid = %self.grid_id, "restoring unfiltered snapshot");
                state.page = snapshot;
                true
            }
            None => false,
        }
    }

    /// Fetch the page for `query` unless it is redundant.
    ///
    /// `force` bypasses the duplicate check (explicit refresh). A failed
    /// fetch leaves the current page in place and returns the error.
    pub async fn submit(&self, query: &QueryState, force: bool) -> Result<Outcome> {
        let plan = self.plan_for(query);
        let handle = self.debouncer.schedule();

        if !force && self.state.borrow().last_plan.as_ref() == Some(&plan) {
            debug!(grid = %self.grid_id, mode = %plan.mode(), "skipping duplicate fetch");
            return Ok(Outcome::Duplicate);
        }

        if !handle.ready().await {
            debug!(grid = %self.grid_id, "fetch superseded during debounce");
            return Ok(Outcome::Superseded);
        }

        let request_id = {
            let mut state = self.state.borrow_mut();
            state.next_request_id += 1;
            state.latest_request_id = state.next_request_id;
            state.last_plan = Some(plan.clone());
            state.loading = true;
            state.next_request_id
        };
        debug!(
            grid = %self.grid_id,
            request_id,
            mode = %plan.mode(),
            page = plan.page_index(),
            page_size = plan.page_size(),
            "dispatching fetch"
        );

        let fetch = self.source.fetch(plan.clone());
        let (result, ()) = tokio::join!(fetch, tokio::time::sleep(self.settings.min_loading()));

        let mut state = self.state.borrow_mut();
        if state.latest_request_id != request_id {
            debug!(
                grid = %self.grid_id,
                request_id,
                latest = state.latest_request_id,
                "discarding stale response"
            );
            return Ok(Outcome::Stale);
        }
        state.loading = false;

        match result {
            Ok(raw) => {
                let page = Rc::new(raw.normalize(plan.page_size()));
                info!(
                    grid = %self.grid_id,
                    request_id,
                    rows = page.len(),
                    page = page.current_page,
                    total_pages = page.total_pages,
                    "page loaded"
                );
                if plan.mode() == FilterMode::None {
                    state.unfiltered = Some(Rc::clone(&page));
                }
                state.page = page;
                Ok(Outcome::Applied)
            }
            Err(error) => {
                warn!(grid = %self.grid_id, request_id, %error, "fetch failed");
                state.last_plan = None;
                Err(GridError::Fetch(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use sgrid_model::{FetchError, ListRequest, RawPage};

    fn grid() -> GridId {
        GridId::new("orders").unwrap()
    }

    fn echo_source() -> GridSource<Value> {
        GridSource::remote(|request: ListRequest| async move {
            Ok::<_, FetchError>(RawPage::from_rows(vec![json!({"page": request.page_index})]))
        })
    }

    #[tokio::test(start_paused = true)]
    async fn missing_current_page_defaults_to_first() {
        let orchestrator = QueryOrchestrator::new(grid(), echo_source(), GridSettings::immediate());
        let outcome = orchestrator
            .submit(&QueryState::default().with_page(4), false)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(orchestrator.page().current_page, 1);
        assert_eq!(orchestrator.page().total_pages, 1);
        assert_eq!(orchestrator.page().rows[0]["page"], 4);
    }

    #[tokio::test(start_paused = true)]
    async fn only_unfiltered_pages_are_snapshotted() {
        let orchestrator = QueryOrchestrator::new(grid(), echo_source(), GridSettings::immediate());
        orchestrator.submit(&QueryState::default(), false).await.unwrap();
        let snapshot = orchestrator.unfiltered().unwrap();

        let searched = QueryState::default().with_filter(sgrid_model::ActiveFilter::Search {
            term: "x".into(),
        });
        orchestrator.submit(&searched, false).await.unwrap();
        assert!(Rc::ptr_eq(&orchestrator.unfiltered().unwrap(), &snapshot));
        assert!(!Rc::ptr_eq(&orchestrator.page(), &snapshot));

        assert!(orchestrator.restore_unfiltered());
        assert!(Rc::ptr_eq(&orchestrator.page(), &snapshot));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_clears_loading() {
        let source = GridSource::<Value>::remote(|_request: ListRequest| async {
            Err(FetchError::new("offline"))
        });
        let orchestrator = QueryOrchestrator::new(grid(), source, GridSettings::default());
        let result = orchestrator.submit(&QueryState::default(), false).await;
        assert!(matches!(result, Err(GridError::Fetch(_))));
        assert!(!orchestrator.is_loading());
    }
}
