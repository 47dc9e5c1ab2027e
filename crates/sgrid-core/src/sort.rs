//! Client-side sorting of the displayed page.
//!
//! Sorting never goes to the server; it reorders the rows already on screen.
//! Values compare in natural order, so `item2` sorts before `item10`.

use std::cmp::Ordering;

use sgrid_model::{ColumnDescriptor, GridRow};
use tracing::debug;

// =============================================================================
// NATURAL ORDER
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Run<'a> {
    Digits(&'a str),
    Text(&'a str),
}

/// Splits a string into alternating digit and non-digit runs.
struct Runs<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Runs<'a> {
    type Item = Run<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map_or(self.rest.len(), |(i, _)| i);
        let (run, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if digits { Run::Digits(run) } else { Run::Text(run) })
    }
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

fn compare_runs(a: Run<'_>, b: Run<'_>) -> Ordering {
    match (a, b) {
        (Run::Digits(a), Run::Digits(b)) => compare_digits(a, b),
        (Run::Text(a), Run::Text(b)) => compare_text(a, b),
        (Run::Digits(_), Run::Text(_)) => Ordering::Less,
        (Run::Text(_), Run::Digits(_)) => Ordering::Greater,
    }
}

/// Natural-order comparison.
///
/// Digit runs compare by numeric value (any length), other runs compare
/// case-insensitively. Strings that are equal under those rules are ordered
/// by their raw bytes so the result is a total order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Runs { rest: a };
    let mut right = Runs { rest: b };
    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match compare_runs(x, y) {
                Ordering::Equal => {}
                other => return other,
            },
        }
    }
}

// =============================================================================
// SORT STATE
// =============================================================================

/// Sort direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    /// Direction applied when a new column is chosen.
    #[default]
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Which column the displayed page is sorted by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    column: Option<String>,
    direction: SortDirection,
}

impl SortState {
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Sort by `key`, flipping direction if it is already the sort column.
    ///
    /// Returns false (and changes nothing) when `key` is not a sortable column.
    pub fn select(&mut self, columns: &[ColumnDescriptor], key: &str) -> bool {
        if !columns.iter().any(|c| c.key == key && c.sortable) {
            debug!(column = key, "ignoring sort on non-sortable column");
            return false;
        }
        if self.column.as_deref() == Some(key) {
            self.direction = self.direction.toggled();
        } else {
            self.column = Some(key.to_string());
            self.direction = SortDirection::default();
        }
        true
    }

    /// Pick the first sortable column when none has been chosen yet.
    ///
    /// Only happens once rows exist; returns true when a column was picked.
    pub fn auto_select(&mut self, columns: &[ColumnDescriptor], has_rows: bool) -> bool {
        if self.column.is_some() || !has_rows {
            return false;
        }
        match sgrid_model::first_sortable(columns) {
            Some(index) => {
                self.column = Some(columns[index].key.clone());
                self.direction = SortDirection::default();
                true
            }
            None => false,
        }
    }

    /// Display order of `rows` under this state (identity when unsorted).
    pub fn order<R: GridRow>(&self, rows: &[R]) -> Vec<usize> {
        match &self.column {
            Some(key) => sort_order(rows, key, self.direction),
            None => (0..rows.len()).collect(),
        }
    }
}

/// Stable permutation of `rows` ordered by the field `key`.
///
/// Rows without the field sort as an empty string.
pub fn sort_order<R: GridRow>(rows: &[R], key: &str, direction: SortDirection) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        let left = rows[a].field(key);
        let right = rows[b].field(key);
        direction.apply(natural_cmp(
            left.as_deref().unwrap_or(""),
            right.as_deref().unwrap_or(""),
        ))
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    fn sorted(values: &[&str]) -> Vec<String> {
        let mut values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        values.sort_by(|a, b| natural_cmp(a, b));
        values
    }

    #[test]
    fn numbers_inside_text_compare_numerically() {
        assert_eq!(
            sorted(&["item2", "item10", "item1"]),
            vec!["item1", "item2", "item10"]
        );
    }

    #[test]
    fn long_digit_runs_do_not_overflow() {
        assert_eq!(
            sorted(&["x100000000000000000000001", "x99"]),
            vec!["x99", "x100000000000000000000001"]
        );
    }

    #[test]
    fn text_is_case_insensitive() {
        assert_eq!(sorted(&["beta", "Alpha", "alpha"]), vec!["Alpha", "alpha", "beta"]);
    }

    #[test]
    fn digits_sort_before_letters() {
        assert_eq!(sorted(&["a", "1"]), vec!["1", "a"]);
    }

    #[test]
    fn new_column_starts_descending_then_toggles() {
        let columns = vec![
            ColumnDescriptor::new("name", "Name").sortable(),
            ColumnDescriptor::new("city", "City").sortable(),
            ColumnDescriptor::new("notes", "Notes"),
        ];
        let mut state = SortState::default();

        assert!(state.select(&columns, "name"));
        assert_eq!(state.direction(), SortDirection::Descending);
        assert!(state.select(&columns, "name"));
        assert_eq!(state.direction(), SortDirection::Ascending);
        assert!(state.select(&columns, "city"));
        assert_eq!(state.column(), Some("city"));
        assert_eq!(state.direction(), SortDirection::Descending);

        assert!(!state.select(&columns, "notes"));
        assert!(!state.select(&columns, "missing"));
        assert_eq!(state.column(), Some("city"));
    }

    #[test]
    fn auto_select_waits_for_rows() {
        let columns = vec![
            ColumnDescriptor::new("id", "ID"),
            ColumnDescriptor::new("name", "Name").sortable(),
        ];
        let mut state = SortState::default();
        assert!(!state.auto_select(&columns, false));
        assert!(state.auto_select(&columns, true));
        assert_eq!(state.column(), Some("name"));
        // Already chosen, stays put.
        assert!(!state.auto_select(&columns, true));
    }

    #[test]
    fn sort_order_is_stable() {
        let rows: Vec<Value> = vec![
            json!({"k": "b", "n": 1}),
            json!({"k": "a", "n": 2}),
            json!({"k": "b", "n": 3}),
            json!({"n": 4}),
        ];
        assert_eq!(sort_order(&rows, "k", SortDirection::Ascending), vec![3, 1, 0, 2]);
        assert_eq!(sort_order(&rows, "k", SortDirection::Descending), vec![0, 2, 1, 3]);
    }

    proptest! {
        #[test]
        fn embedded_numbers_follow_numeric_order(a in 0u64..100_000, b in 0u64..100_000) {
            let left = format!("item{a}");
            let right = format!("item{b}");
            prop_assert_eq!(natural_cmp(&left, &right), a.cmp(&b));
        }

        #[test]
        fn comparison_is_antisymmetric(a in "[a-zA-Z0-9]{0,8}", b in "[a-zA-Z0-9]{0,8}") {
            prop_assert_eq!(natural_cmp(&a, &b), natural_cmp(&b, &a).reverse());
        }
    }
}
