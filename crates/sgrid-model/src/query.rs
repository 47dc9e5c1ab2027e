//! Query state types.
//!
//! A grid's query state is a tagged union over the active filter mode. Only
//! one filtering strategy can be authoritative at a time, which the type
//! makes impossible to violate: there is no way to hold a search term and a
//! set of quick filters in the same value.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Filter keys mapped to their values, ordered for stable signatures.
pub type FilterSet = BTreeMap<String, FilterValue>;

// =============================================================================
// FILTER VALUE
// =============================================================================

/// Scalar or array value carried by a filter key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Flag(bool),
    Integer(i64),
    Text(String),
    Many(Vec<String>),
}

impl FilterValue {
    /// A blank string or an empty array carries no constraint.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Many(values) => values.iter().all(|v| v.trim().is_empty()),
            Self::Flag(_) | Self::Integer(_) => false,
        }
    }

    /// Whether `candidate` satisfies this value (exact, case-insensitive).
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        match self {
            Self::Flag(flag) => candidate.eq_ignore_ascii_case(if *flag { "true" } else { "false" }),
            Self::Integer(number) => candidate.parse::<i64>().is_ok_and(|c| c == *number),
            Self::Text(text) => text.trim().eq_ignore_ascii_case(candidate),
            Self::Many(values) => values
                .iter()
                .any(|value| value.trim().eq_ignore_ascii_case(candidate)),
        }
    }

    /// Convert a loosely typed JSON value, dropping shapes a filter cannot hold.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Bool(flag) => Some(Self::Flag(*flag)),
            Value::Number(number) => Some(
                number
                    .as_i64()
                    .map_or_else(|| Self::Text(number.to_string()), Self::Integer),
            ),
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Array(items) => Some(Self::Many(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text.clone()),
                        Value::Number(number) => Some(number.to_string()),
                        Value::Bool(flag) => Some(flag.to_string()),
                        _ => None,
                    })
                    .collect(),
            )),
            Value::Null | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Integer(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
            Self::Many(values) => f.write_str(&values.join(", ")),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

// =============================================================================
// FILTER MODE
// =============================================================================

/// Discriminator naming which fetch strategy is authoritative.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Plain list fetch.
    #[default]
    None,
    /// Per-column quick filters on top of the list fetch.
    List,
    /// Free-text search.
    Search,
    /// Advanced multi-field filter panel.
    FilterBy,
}

impl FilterMode {
    /// Wire name stored under the reserved `mode` key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::List => "list",
            Self::Search => "search",
            Self::FilterBy => "filterBy",
        }
    }

    /// Parse a wire name. Unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "none" | "" => Some(Self::None),
            "list" => Some(Self::List),
            "search" => Some(Self::Search),
            "filterBy" | "filter_by" | "filterby" => Some(Self::FilterBy),
            _ => None,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ACTIVE FILTER
// =============================================================================

/// The filter currently applied to a grid, one variant per mode.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum ActiveFilter {
    #[default]
    None,
    List {
        quick_filters: FilterSet,
    },
    Search {
        term: String,
    },
    FilterBy {
        fields: FilterSet,
    },
}

impl ActiveFilter {
    pub fn mode(&self) -> FilterMode {
        match self {
            Self::None => FilterMode::None,
            Self::List { .. } => FilterMode::List,
            Self::Search { .. } => FilterMode::Search,
            Self::FilterBy { .. } => FilterMode::FilterBy,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Quick filters, when in list mode.
    pub fn quick_filters(&self) -> Option<&FilterSet> {
        match self {
            Self::List { quick_filters } => Some(quick_filters),
            _ => None,
        }
    }

    /// Search term, when in search mode.
    pub fn search_term(&self) -> Option<&str> {
        match self {
            Self::Search { term } => Some(term),
            _ => None,
        }
    }

    /// Advanced filter fields, when in filterBy mode.
    pub fn filter_by_fields(&self) -> Option<&FilterSet> {
        match self {
            Self::FilterBy { fields } => Some(fields),
            _ => None,
        }
    }
}

// =============================================================================
// QUERY STATE
// =============================================================================

/// Everything describing what a grid is currently displaying.
///
/// Serializes to (and deserializes from) the flat key/value layout stored in
/// navigation entries; see [`crate::flat`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    into = "crate::flat::FlatState",
    from = "serde_json::Map<String, serde_json::Value>"
)]
pub struct QueryState {
    /// Current page (1-based).
    pub page: u32,
    /// Rows per page; `None` means the grid's configured default.
    pub page_size: Option<u32>,
    /// Active filter.
    pub filter: ActiveFilter,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: None,
            filter: ActiveFilter::None,
        }
    }
}

impl QueryState {
    pub fn mode(&self) -> FilterMode {
        self.filter.mode()
    }

    /// Replace the filter and return to the first page.
    #[must_use]
    pub fn with_filter(&self, filter: ActiveFilter) -> Self {
        Self {
            page: 1,
            page_size: self.page_size,
            filter,
        }
    }

    /// Move to another page, keeping filters.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Change the page size and return to the first page.
    #[must_use]
    pub fn with_page_size(&self, page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: Some(page_size.max(1)),
            filter: self.filter.clone(),
        }
    }

    /// Effective page size given the grid's default.
    pub fn page_size_or(&self, default: u32) -> u32 {
        self.page_size.unwrap_or(default).max(1)
    }
}
