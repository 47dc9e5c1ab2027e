//! Command handlers.

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{info, warn};

use sgrid_cli::dataset::Dataset;
use sgrid_cli::render::{columns_table, page_footer, page_table};
use sgrid_core::{DataGrid, GridSettings, GridSource, SortDirection};
use sgrid_history::{HistoryStore, MemoryNavigation};
use sgrid_model::{FilterSet, FilterValue};
use sgrid_persistence::{DurableStore, FileStore, MemoryStore};

use crate::cli::{ColumnsAction, ColumnsArgs, GridArgs, ViewArgs};

/// Fetch and print one page of a dataset.
pub async fn run_view(args: &ViewArgs) -> Result<()> {
    let mut settings = load_settings(&args.grid);
    if args.no_delay {
        settings = GridSettings {
            debounce_ms: 0,
            min_loading_ms: 0,
            ..settings
        };
    }
    let grid = mount_grid(&args.grid, settings)?;

    if let Some(term) = &args.search {
        grid.submit_search(term)?;
    }
    if !args.filter.is_empty() {
        let fields: FilterSet = args
            .filter
            .iter()
            .map(|(key, value)| (key.clone(), FilterValue::from(value.as_str())))
            .collect();
        grid.apply_filter_by(fields)?;
    }
    for (key, value) in group_quick_filters(&args.quick) {
        grid.set_quick_filter(&key, Some(value))?;
    }
    if let Some(size) = args.page_size {
        grid.set_page_size(size)?;
    }
    if args.page > 1 {
        grid.go_to_page(args.page)?;
    }

    let spinner = loading_spinner();
    let loaded = grid.load().await;
    spinner.finish_and_clear();
    let outcome = loaded.context("fetch page")?;
    info!(grid = %grid.grid_id(), ?outcome, "page loaded");

    if let Some(key) = &args.sort {
        if grid.columns().iter().all(|c| &c.key != key) {
            bail!("unknown sort column `{key}`");
        }
        let wanted = if args.ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };
        if grid.sort_state().0.as_deref() != Some(key.as_str()) {
            grid.sort_by(key);
        }
        if grid.sort_state().1 != wanted {
            grid.sort_by(key);
        }
    }

    let columns = grid.visible_columns();
    let displayed = grid.displayed();
    let (sort_key, direction) = grid.sort_state();
    let table = page_table(&columns, displayed.rows(), (sort_key.as_deref(), direction));
    println!("{table}");
    println!("{}", page_footer(displayed.page(), grid.mode()));
    Ok(())
}

/// List or change the persisted column layout.
pub fn run_columns(args: &ColumnsArgs) -> Result<()> {
    let grid = mount_grid(&args.grid, load_settings(&args.grid))?;

    match &args.action {
        ColumnsAction::List => {}
        ColumnsAction::Show { keys } => set_visibility(&grid, keys, true)?,
        ColumnsAction::Hide { keys } => set_visibility(&grid, keys, false)?,
        ColumnsAction::Reset => grid.reset_columns(),
    }

    println!(
        "{}",
        columns_table(
            grid.columns(),
            &grid.column_order(),
            &grid.visible_column_indices()
        )
    );
    Ok(())
}

fn set_visibility(grid: &DataGrid<Value>, keys: &[String], show: bool) -> Result<()> {
    for key in keys {
        let Some(index) = grid.columns().iter().position(|c| &c.key == key) else {
            bail!("unknown column `{key}`");
        };
        if grid.is_column_visible(index) == show {
            continue;
        }
        if !grid.set_column_visible_by_key(key, show) {
            bail!("cannot hide `{key}`: at least one column must stay visible");
        }
    }
    Ok(())
}

fn mount_grid(args: &GridArgs, settings: GridSettings) -> Result<DataGrid<Value>> {
    let dataset = Dataset::load(&args.data)?;
    let grid_id = match &args.grid_id {
        Some(id) => id.clone(),
        None => default_grid_id(&args.data),
    };
    let history = HistoryStore::shared(MemoryNavigation::new());
    let grid = DataGrid::builder(history, open_storage(args))
        .grid_id(grid_id)
        .columns(dataset.columns)
        .source(GridSource::from_data(dataset.rows))
        .settings(settings)
        .mount()?;
    Ok(grid)
}

fn load_settings(args: &GridArgs) -> GridSettings {
    match &args.settings {
        Some(path) => GridSettings::load_from(path),
        None => GridSettings::load(),
    }
}

fn open_storage(args: &GridArgs) -> Rc<dyn DurableStore> {
    if let Some(path) = &args.storage {
        return Rc::new(FileStore::open(path.clone()));
    }
    match FileStore::open_default() {
        Ok(store) => Rc::new(store),
        Err(error) => {
            warn!(error = %error.user_message(), "column layouts will not be saved");
            Rc::new(MemoryStore::new())
        }
    }
}

fn default_grid_id(data: &Path) -> String {
    data.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .unwrap_or_default()
}

/// Repeated `--quick` values on one column combine into a multi-value filter.
fn group_quick_filters(pairs: &[(String, String)]) -> BTreeMap<String, FilterValue> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in pairs {
        grouped.entry(key.clone()).or_default().push(value.clone());
    }
    grouped
        .into_iter()
        .map(|(key, mut values)| {
            let value = if values.len() == 1 {
                FilterValue::Text(values.remove(0))
            } else {
                FilterValue::Many(values)
            };
            (key, value)
        })
        .collect()
}

fn loading_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style.tick_strings(&[
            "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " ",
        ]));
    }
    spinner.set_message("Loading page…");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_values_group_by_column() {
        let pairs = vec![
            ("city".to_string(), "Oslo".to_string()),
            ("status".to_string(), "open".to_string()),
            ("city".to_string(), "Bergen".to_string()),
        ];
        let grouped = group_quick_filters(&pairs);
        assert_eq!(
            grouped["city"],
            FilterValue::Many(vec!["Oslo".to_string(), "Bergen".to_string()])
        );
        assert_eq!(grouped["status"], FilterValue::Text("open".to_string()));
    }

    #[test]
    fn grid_id_defaults_to_file_stem() {
        assert_eq!(default_grid_id(Path::new("/tmp/orders.csv")), "orders");
    }
}
