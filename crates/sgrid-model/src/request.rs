//! Requests handed to host fetch callbacks.

use serde::{Deserialize, Serialize};

use crate::query::{ActiveFilter, FilterMode, FilterSet, FilterValue, QueryState};

/// Parameters for the `list` callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub page_index: u32,
    pub page_size: u32,
    /// Quick filters applied on top of the base list.
    #[serde(default)]
    pub extra_filters: FilterSet,
}

/// Parameters for the `search` callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub term: String,
    pub page_size: u32,
    pub page_index: u32,
}

/// Parameters for the `filterBy` callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterByRequest {
    pub filters: FilterSet,
    pub page_size: u32,
    pub page_index: u32,
}

/// The fetch a query state resolves to.
///
/// Doubles as the request signature: two states producing equal plans would
/// fetch the same page, so the second one can be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchPlan {
    List(ListRequest),
    Search(SearchRequest),
    FilterBy(FilterByRequest),
}

impl FetchPlan {
    /// Resolve the plan for `state`, using `default_page_size` when the state
    /// does not carry one.
    pub fn for_state(state: &QueryState, default_page_size: u32) -> Self {
        let page_index = state.page.max(1);
        let page_size = state.page_size_or(default_page_size);
        match &state.filter {
            ActiveFilter::None => Self::List(ListRequest {
                page_index,
                page_size,
                extra_filters: FilterSet::new(),
            }),
            ActiveFilter::List { quick_filters } => Self::List(ListRequest {
                page_index,
                page_size,
                extra_filters: quick_filters.clone(),
            }),
            ActiveFilter::Search { term } => Self::Search(SearchRequest {
                term: term.clone(),
                page_size,
                page_index,
            }),
            ActiveFilter::FilterBy { fields } => Self::FilterBy(FilterByRequest {
                filters: fields.clone(),
                page_size,
                page_index,
            }),
        }
    }

    pub fn mode(&self) -> FilterMode {
        match self {
            Self::List(request) if request.extra_filters.is_empty() => FilterMode::None,
            Self::List(_) => FilterMode::List,
            Self::Search(_) => FilterMode::Search,
            Self::FilterBy(_) => FilterMode::FilterBy,
        }
    }

    pub fn page_index(&self) -> u32 {
        match self {
            Self::List(request) => request.page_index,
            Self::Search(request) => request.page_index,
            Self::FilterBy(request) => request.page_index,
        }
    }

    pub fn page_size(&self) -> u32 {
        match self {
            Self::List(request) => request.page_size,
            Self::Search(request) => request.page_size,
            Self::FilterBy(request) => request.page_size,
        }
    }

    /// Rewrite this plan as a list request, carrying the mode's parameters
    /// as extra filters. Used when the host has no callback for the mode.
    pub fn into_list(self) -> ListRequest {
        match self {
            Self::List(request) => request,
            Self::Search(request) => {
                let mut extra_filters = FilterSet::new();
                extra_filters.insert(
                    crate::flat::SEARCH_KEY.to_string(),
                    FilterValue::Text(request.term),
                );
                ListRequest {
                    page_index: request.page_index,
                    page_size: request.page_size,
                    extra_filters,
                }
            }
            Self::FilterBy(request) => ListRequest {
                page_index: request.page_index,
                page_size: request.page_size,
                extra_filters: request.filters,
            },
        }
    }
}
