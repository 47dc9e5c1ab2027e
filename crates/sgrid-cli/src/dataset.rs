//! Loading CSV and JSON files into grid rows and column declarations.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use sgrid_model::{ColumnDescriptor, FilterOption, GridRow, QuickFilterSpec};
use tracing::debug;

/// Columns beyond this many start hidden.
pub const SHOWN_BY_DEFAULT: usize = 6;

/// Columns with at most this many distinct values get a quick filter.
pub const QUICK_FILTER_MAX_OPTIONS: usize = 8;

/// Rows and the columns derived from them.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Value>,
}

impl Dataset {
    /// Load a dataset, picking the format from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let (keys, rows) = match extension.as_deref() {
            Some("csv") => read_csv(path)?,
            Some("json") => read_json(path)?,
            other => bail!(
                "unsupported data file extension {:?} (expected .csv or .json)",
                other.unwrap_or("")
            ),
        };
        debug!(path = %path.display(), rows = rows.len(), columns = keys.len(), "loaded dataset");
        Ok(Self::from_rows(keys, rows))
    }

    /// Build column declarations for `keys` from the values in `rows`.
    pub fn from_rows(keys: Vec<String>, rows: Vec<Value>) -> Self {
        let columns = keys
            .into_iter()
            .enumerate()
            .map(|(index, key)| describe_column(index, key, &rows))
            .collect();
        Self { columns, rows }
    }

    pub fn column_keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }
}

fn describe_column(index: usize, key: String, rows: &[Value]) -> ColumnDescriptor {
    let values: BTreeSet<String> = rows
        .iter()
        .filter_map(|row| row.field(&key).map(Cow::into_owned))
        .filter(|v| !v.is_empty())
        .collect();

    let label = label_for(&key);
    let mut column = ColumnDescriptor::new(key, label).sortable();
    if index < SHOWN_BY_DEFAULT {
        column = column.shown_by_default();
    }
    // A column where every row differs is not worth a dropdown.
    if values.len() > 1 && values.len() <= QUICK_FILTER_MAX_OPTIONS && values.len() < rows.len() {
        let options = values
            .into_iter()
            .map(|value| FilterOption::new(value.clone(), value))
            .collect();
        column = column.with_filter(QuickFilterSpec::multi(options));
    }
    column
}

/// `order_date` and `orderDate` both become `Order Date`.
fn label_for(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if ch.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Value>)> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("read headers from {}", path.display()))?
        .iter()
        .map(ToString::to_string)
        .collect();
    if headers.iter().all(String::is_empty) {
        bail!("{} has no header row", path.display());
    }

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("read record {} of {}", line + 1, path.display()))?;
        let mut row = Map::new();
        for (key, value) in headers.iter().zip(record.iter()) {
            if key.is_empty() {
                continue;
            }
            row.insert(key.clone(), Value::String(value.to_string()));
        }
        rows.push(Value::Object(row));
    }
    let keys = headers.into_iter().filter(|k| !k.is_empty()).collect();
    Ok((keys, rows))
}

fn read_json(path: &Path) -> Result<(Vec<String>, Vec<Value>)> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))?;
    json_rows(value).with_context(|| format!("load rows from {}", path.display()))
}

/// Accepts a bare array of objects or an object wrapping one under `rows`,
/// `data` or `items`.
pub fn json_rows(value: Value) -> Result<(Vec<String>, Vec<Value>)> {
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut object) => match ["rows", "data", "items"]
            .iter()
            .find_map(|key| object.remove(*key))
        {
            Some(Value::Array(rows)) => rows,
            _ => bail!("expected an array of rows, or an object with a `rows` array"),
        },
        _ => bail!("expected an array of rows"),
    };

    let mut keys: Vec<String> = Vec::new();
    for row in &rows {
        let Value::Object(object) = row else {
            bail!("every row must be a JSON object");
        };
        for key in object.keys() {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.clone());
            }
        }
    }
    Ok((keys, rows))
}
