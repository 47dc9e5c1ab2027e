//! Column declarations supplied by host pages.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// One selectable value in a quick-filter dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

impl FilterOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Per-column quick filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickFilterSpec {
    pub options: Vec<FilterOption>,
    /// Single-select: picking a value replaces the previous one.
    /// Multi-select: picking a value toggles its membership.
    pub is_single: bool,
}

impl QuickFilterSpec {
    pub fn single(options: Vec<FilterOption>) -> Self {
        Self {
            options,
            is_single: true,
        }
    }

    pub fn multi(options: Vec<FilterOption>) -> Self {
        Self {
            options,
            is_single: false,
        }
    }
}

/// Static declaration of one grid column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Row field this column displays. Unique within one grid.
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub show_by_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<QuickFilterSpec>,
}

impl ColumnDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: false,
            show_by_default: false,
            filter: None,
        }
    }

    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    #[must_use]
    pub fn shown_by_default(mut self) -> Self {
        self.show_by_default = true;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: QuickFilterSpec) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Check that every column has a non-empty, unique key.
pub fn validate_columns(columns: &[ColumnDescriptor]) -> Result<()> {
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if column.key.trim().is_empty() {
            return Err(ModelError::EmptyColumnKey(column.label.clone()));
        }
        if !seen.insert(column.key.as_str()) {
            return Err(ModelError::DuplicateColumnKey(column.key.clone()));
        }
    }
    Ok(())
}

/// Index of the first sortable column.
pub fn first_sortable(columns: &[ColumnDescriptor]) -> Option<usize> {
    columns.iter().position(|c| c.sortable)
}
