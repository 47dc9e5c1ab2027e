//! Flat key/value codec for [`QueryState`].
//!
//! Navigation entries store each grid's state as a flat map:
//!
//! ```text
//! { "mode": "list", "page": 2, "pageSize": 25, "status": "active", "region": ["eu", "us"] }
//! ```
//!
//! Four keys are reserved; every other key is a filter key belonging to the
//! active mode. Decoding is permissive: unknown modes, missing pages and
//! mistyped values fall back to defaults instead of failing, because payloads
//! may come from older builds or be edited by the browser.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::query::{ActiveFilter, FilterMode, FilterSet, FilterValue, QueryState};

/// Reserved key holding the active filter mode.
pub const MODE_KEY: &str = "mode";
/// Reserved key holding the 1-based page number.
pub const PAGE_KEY: &str = "page";
/// Reserved key holding the page size.
pub const PAGE_SIZE_KEY: &str = "pageSize";
/// Reserved key holding the free-text search term.
pub const SEARCH_KEY: &str = "search";

/// All keys a filter may not use.
pub const RESERVED_KEYS: [&str; 4] = [MODE_KEY, PAGE_KEY, PAGE_SIZE_KEY, SEARCH_KEY];

/// Flat representation of a query state.
pub type FlatState = BTreeMap<String, FilterValue>;

/// Whether `key` is reserved for grid bookkeeping.
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Encode a query state into its flat layout.
pub fn encode(state: &QueryState) -> FlatState {
    let mut flat = FlatState::new();
    flat.insert(
        MODE_KEY.to_string(),
        FilterValue::Text(state.mode().as_str().to_string()),
    );
    flat.insert(PAGE_KEY.to_string(), FilterValue::Integer(i64::from(state.page)));
    if let Some(size) = state.page_size {
        flat.insert(PAGE_SIZE_KEY.to_string(), FilterValue::Integer(i64::from(size)));
    }

    match &state.filter {
        ActiveFilter::None => {}
        ActiveFilter::Search { term } => {
            flat.insert(SEARCH_KEY.to_string(), FilterValue::Text(term.clone()));
        }
        ActiveFilter::List {
            quick_filters: filters,
        }
        | ActiveFilter::FilterBy { fields: filters } => {
            for (key, value) in filters {
                if !is_reserved_key(key) {
                    flat.insert(key.clone(), value.clone());
                }
            }
        }
    }
    flat
}

/// Decode a flat JSON object into a query state.
pub fn decode(map: &Map<String, Value>) -> QueryState {
    let page = map.get(PAGE_KEY).and_then(positive_u32).unwrap_or(1);
    let page_size = map.get(PAGE_SIZE_KEY).and_then(positive_u32);

    let search = map
        .get(SEARCH_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|term| !term.trim().is_empty());

    let filters: FilterSet = map
        .iter()
        .filter(|(key, _)| !is_reserved_key(key))
        .filter_map(|(key, value)| FilterValue::from_json(value).map(|v| (key.clone(), v)))
        .filter(|(_, value)| !value.is_empty())
        .collect();

    let mode = match map.get(MODE_KEY).and_then(Value::as_str) {
        Some(name) => FilterMode::parse(name).unwrap_or_default(),
        // Payloads written without a mode: infer it from what is present.
        None if search.is_some() => FilterMode::Search,
        None if !filters.is_empty() => FilterMode::List,
        None => FilterMode::None,
    };

    let filter = match mode {
        FilterMode::None => ActiveFilter::None,
        FilterMode::Search => match search {
            Some(term) => ActiveFilter::Search { term },
            None => ActiveFilter::None,
        },
        FilterMode::List if filters.is_empty() => ActiveFilter::None,
        FilterMode::List => ActiveFilter::List {
            quick_filters: filters,
        },
        FilterMode::FilterBy if filters.is_empty() => ActiveFilter::None,
        FilterMode::FilterBy => ActiveFilter::FilterBy { fields: filters },
    };

    QueryState {
        page,
        page_size,
        filter,
    }
}

/// Decode from any JSON value; non-objects decode to the default state.
pub fn decode_value(value: &Value) -> QueryState {
    value.as_object().map(decode).unwrap_or_default()
}

fn positive_u32(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 1.0).map(|f| f as u64)),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    u32::try_from(number).ok().filter(|n| *n >= 1)
}

impl From<QueryState> for FlatState {
    fn from(state: QueryState) -> Self {
        encode(&state)
    }
}

impl From<Map<String, Value>> for QueryState {
    fn from(map: Map<String, Value>) -> Self {
        decode(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn decodes_search_state() {
        let state = decode(&object(json!({"mode": "search", "page": 3, "search": "acme"})));
        assert_eq!(state.page, 3);
        assert_eq!(state.filter.search_term(), Some("acme"));
    }

    #[test]
    fn search_mode_without_term_is_unfiltered() {
        let state = decode(&object(json!({"mode": "search", "search": "  "})));
        assert_eq!(state.filter, ActiveFilter::None);
    }

    #[test]
    fn malformed_page_defaults_to_first() {
        for page in [json!(0), json!(-4), json!("abc"), json!(null), json!([2])] {
            let state = decode(&object(json!({"page": page})));
            assert_eq!(state.page, 1);
        }
        let state = decode(&object(json!({"page": "7"})));
        assert_eq!(state.page, 7);
    }

    #[test]
    fn unknown_mode_falls_back_to_none() {
        let state = decode(&object(json!({"mode": "bogus", "status": "open"})));
        assert_eq!(state.mode(), FilterMode::None);
    }

    #[test]
    fn missing_mode_is_inferred() {
        let state = decode(&object(json!({"status": "open"})));
        assert_eq!(state.mode(), FilterMode::List);
        let state = decode(&object(json!({"search": "x", "status": "open"})));
        assert_eq!(state.mode(), FilterMode::Search);
    }

    #[test]
    fn encode_skips_reserved_filter_keys() {
        let mut fields = FilterSet::new();
        fields.insert("page".into(), FilterValue::Integer(9));
        fields.insert("owner".into(), FilterValue::from("ops"));
        let state = QueryState::default().with_filter(ActiveFilter::FilterBy { fields });
        let flat = encode(&state);
        assert_eq!(flat.get(PAGE_KEY), Some(&FilterValue::Integer(1)));
        assert_eq!(flat.get("owner"), Some(&FilterValue::from("ops")));
    }

    #[test]
    fn decode_drops_objects_and_nulls() {
        let state = decode(&object(json!({
            "mode": "filterBy",
            "owner": {"nested": true},
            "region": null,
            "city": "Oslo"
        })));
        let fields = state.filter.filter_by_fields().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("city"), Some(&FilterValue::from("Oslo")));
    }
}
