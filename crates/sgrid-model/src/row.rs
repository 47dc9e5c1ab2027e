//! Field access for displayed rows.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

/// A row the grid can sort, search and filter by field key.
pub trait GridRow {
    /// Text of the field named `key`, or `None` when the row has no value.
    fn field(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl GridRow for Value {
    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.get(key)? {
            Value::Null => None,
            Value::String(text) => Some(Cow::Borrowed(text.as_str())),
            Value::Number(number) => Some(Cow::Owned(number.to_string())),
            Value::Bool(flag) => Some(Cow::Borrowed(if *flag { "true" } else { "false" })),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

impl GridRow for BTreeMap<String, String> {
    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Borrowed(value.as_str()))
    }
}

impl GridRow for HashMap<String, String> {
    fn field(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Borrowed(value.as_str()))
    }
}
