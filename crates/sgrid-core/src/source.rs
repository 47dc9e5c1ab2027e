//! Where a grid's rows come from.
//!
//! A host either hands over fetch callbacks (`list`, plus optional `search`
//! and `filter_by`) or a static dataset that is paginated in memory.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture};
use sgrid_model::{
    FetchError, FetchPlan, FilterByRequest, FilterSet, GridRow, ListRequest, RawPage,
    SearchRequest, flat,
};
use tracing::{debug, warn};

use crate::error::{GridError, Result};

/// Future returned by a fetch callback.
pub type FetchFuture<R> = LocalBoxFuture<'static, std::result::Result<RawPage<R>, FetchError>>;

type Callback<Req, R> = Box<dyn Fn(Req) -> FetchFuture<R>>;

fn boxed<Req, R, F, Fut>(callback: F) -> Callback<Req, R>
where
    F: Fn(Req) -> Fut + 'static,
    Fut: Future<Output = std::result::Result<RawPage<R>, FetchError>> + 'static,
{
    Box::new(move |request| callback(request).boxed_local())
}

/// Fetch strategies configured for one grid.
pub struct GridSource<R> {
    list: Option<Callback<ListRequest, R>>,
    search: Option<Callback<SearchRequest, R>>,
    filter_by: Option<Callback<FilterByRequest, R>>,
    data: Option<StaticSource<R>>,
}

impl<R> Default for GridSource<R> {
    fn default() -> Self {
        Self {
            list: None,
            search: None,
            filter_by: None,
            data: None,
        }
    }
}

impl<R> fmt::Debug for GridSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridSource")
            .field("list", &self.list.is_some())
            .field("search", &self.search.is_some())
            .field("filter_by", &self.filter_by.is_some())
            .field("data", &self.data.as_ref().map(StaticSource::len))
            .finish()
    }
}

impl<R: 'static> GridSource<R> {
    /// An empty source. Mounting a grid on it fails until `list` or `data`
    /// is supplied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Source backed by a list callback.
    pub fn remote<F, Fut>(list: F) -> Self
    where
        F: Fn(ListRequest) -> Fut + 'static,
        Fut: Future<Output = std::result::Result<RawPage<R>, FetchError>> + 'static,
    {
        Self::new().list(list)
    }

    #[must_use]
    pub fn list<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(ListRequest) -> Fut + 'static,
        Fut: Future<Output = std::result::Result<RawPage<R>, FetchError>> + 'static,
    {
        self.list = Some(boxed(callback));
        self
    }

    #[must_use]
    pub fn search<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(SearchRequest) -> Fut + 'static,
        Fut: Future<Output = std::result::Result<RawPage<R>, FetchError>> + 'static,
    {
        self.search = Some(boxed(callback));
        self
    }

    #[must_use]
    pub fn filter_by<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(FilterByRequest) -> Fut + 'static,
        Fut: Future<Output = std::result::Result<RawPage<R>, FetchError>> + 'static,
    {
        self.filter_by = Some(boxed(callback));
        self
    }

    pub fn has_search(&self) -> bool {
        self.data.is_some() || self.search.is_some()
    }

    pub fn has_filter_by(&self) -> bool {
        self.data.is_some() || self.filter_by.is_some()
    }

    /// Fail when there is nothing to fetch rows from.
    pub fn validate(&self) -> Result<()> {
        if self.data.is_none() && self.list.is_none() {
            return Err(GridError::Configuration(
                "a grid needs either static data or a list callback".to_string(),
            ));
        }
        Ok(())
    }

    /// Start the fetch described by `plan`.
    ///
    /// Search and filterBy plans fall back to the list callback, with their
    /// parameters passed as extra filters, when the host has no callback for
    /// that mode.
    pub fn fetch(&self, plan: FetchPlan) -> FetchFuture<R>
    where
        R: GridRow + Clone,
    {
        if let Some(data) = &self.data {
            return future::ready(Ok(data.fetch(&plan))).boxed_local();
        }
        let plan = match plan {
            FetchPlan::Search(request) => match &self.search {
                Some(search) => return search(request),
                None => {
                    warn!(term = %request.term, "no search callback, falling back to list");
                    FetchPlan::Search(request)
                }
            },
            FetchPlan::FilterBy(request) => match &self.filter_by {
                Some(filter_by) => return filter_by(request),
                None => {
                    warn!(
                        fields = request.filters.len(),
                        "no filterBy callback, falling back to list"
                    );
                    FetchPlan::FilterBy(request)
                }
            },
            list @ FetchPlan::List(_) => list,
        };
        match &self.list {
            Some(list) => list(plan.into_list()),
            None => future::ready(Err(FetchError::new("no list callback configured"))).boxed_local(),
        }
    }
}

impl<R: GridRow + Clone + 'static> GridSource<R> {
    /// Source serving `rows` from memory.
    pub fn from_data(rows: Vec<R>) -> Self {
        Self {
            data: Some(StaticSource::new(rows)),
            ..Self::default()
        }
    }

    /// Use `rows` as the dataset, overriding any callbacks.
    #[must_use]
    pub fn data(mut self, rows: Vec<R>) -> Self {
        self.data = Some(StaticSource::new(rows));
        self
    }

    /// Restrict static free-text search to these fields.
    pub(crate) fn set_search_keys(&mut self, keys: Vec<String>) {
        if let Some(data) = &mut self.data {
            data.search_keys = keys;
        }
    }
}

// =============================================================================
// STATIC DATA
// =============================================================================

/// In-memory dataset with client-side paging, search and filters.
#[derive(Debug, Clone)]
pub struct StaticSource<R> {
    rows: Rc<[R]>,
    search_keys: Vec<String>,
}

impl<R> StaticSource<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            rows: rows.into(),
            search_keys: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_search_keys(mut self, keys: Vec<String>) -> Self {
        self.search_keys = keys;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R: GridRow + Clone> StaticSource<R> {

    /// Resolve `plan` against the dataset.
    pub fn fetch(&self, plan: &FetchPlan) -> RawPage<R> {
        let matched: Vec<&R> = match plan {
            FetchPlan::List(request) => self.filtered(&request.extra_filters),
            FetchPlan::Search(request) => self
                .rows
                .iter()
                .filter(|row| self.contains_term(row, &request.term))
                .collect(),
            FetchPlan::FilterBy(request) => self.filtered(&request.filters),
        };
        debug!(matched = matched.len(), total = self.rows.len(), "static source query");
        paginate(&matched, plan.page_index(), plan.page_size())
    }

    fn filtered(&self, filters: &FilterSet) -> Vec<&R> {
        self.rows
            .iter()
            .filter(|row| {
                filters.iter().all(|(key, value)| {
                    if key == flat::SEARCH_KEY {
                        return self.contains_term(row, &value.to_string());
                    }
                    row.field(key).is_some_and(|field| value.matches(&field))
                })
            })
            .collect()
    }

    /// Case-insensitive substring match over the search fields.
    fn contains_term(&self, row: &R, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.search_keys.iter().any(|key| {
            row.field(key)
                .is_some_and(|field| field.to_lowercase().contains(&needle))
        })
    }
}

fn paginate<R: Clone>(matched: &[&R], page_index: u32, page_size: u32) -> RawPage<R> {
    let page_size = page_size.max(1);
    let total_records = matched.len() as u64;
    let total_pages = u32::try_from(total_records.div_ceil(u64::from(page_size)))
        .unwrap_or(u32::MAX)
        .max(1);
    let current_page = page_index.clamp(1, total_pages);
    let start = (current_page as usize - 1) * page_size as usize;
    let rows = matched
        .iter()
        .skip(start)
        .take(page_size as usize)
        .map(|row| (*row).clone())
        .collect();

    RawPage {
        rows: Some(rows),
        current_page: Some(current_page),
        page_size: Some(page_size),
        total_pages: Some(total_pages),
        total_records: Some(total_records),
    }
}
