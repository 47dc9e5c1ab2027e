//! Loading datasets from disk and browsing them through a grid.

use std::fs;
use std::rc::Rc;

use sgrid_cli::dataset::{Dataset, SHOWN_BY_DEFAULT};
use sgrid_cli::render::{page_footer, page_table};
use sgrid_core::{DataGrid, GridSettings, GridSource};
use sgrid_history::{HistoryStore, MemoryNavigation};
use sgrid_model::{FilterMode, FilterValue, GridRow};
use sgrid_persistence::FileStore;

const ORDERS: &str = "\
id,customer,city,status,total
1,Acme,Oslo,open,120
2,Globex,Bergen,closed,80
3,Initech,Oslo,open,45
4,Umbrella,Tromso,open,300
5,Hooli,Bergen,closed,12
";

fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

#[test]
fn csv_columns_and_quick_filters() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&write(&dir, "orders.csv", ORDERS)).unwrap();

    assert_eq!(dataset.rows.len(), 5);
    assert_eq!(
        dataset.column_keys().collect::<Vec<_>>(),
        vec!["id", "customer", "city", "status", "total"]
    );
    assert!(dataset.columns.iter().all(|c| c.sortable && c.show_by_default));

    let city = &dataset.columns[2];
    let options: Vec<&str> = city
        .filter
        .as_ref()
        .expect("city quick filter")
        .options
        .iter()
        .map(|o| o.value.as_str())
        .collect();
    assert_eq!(options, vec!["Bergen", "Oslo", "Tromso"]);
    // Every id is distinct, so no dropdown.
    assert!(dataset.columns[0].filter.is_none());
    assert_eq!(dataset.rows[1].field("city").as_deref(), Some("Bergen"));
}

#[test]
fn wide_files_hide_trailing_columns() {
    let header: Vec<String> = (0..SHOWN_BY_DEFAULT + 2).map(|i| format!("c{i}")).collect();
    let row: Vec<String> = (0..SHOWN_BY_DEFAULT + 2).map(|i| i.to_string()).collect();
    let content = format!("{}\n{}\n", header.join(","), row.join(","));
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&write(&dir, "wide.csv", &content)).unwrap();

    let shown = dataset.columns.iter().filter(|c| c.show_by_default).count();
    assert_eq!(shown, SHOWN_BY_DEFAULT);
}

#[test]
fn json_object_with_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "people.json",
        r#"{"rows": [{"name": "Ada", "age": 36}, {"name": "Alan", "age": 41}]}"#,
    );
    let dataset = Dataset::load(&path).unwrap();
    assert_eq!(dataset.rows.len(), 2);
    assert_eq!(dataset.rows[1].field("age").as_deref(), Some("41"));
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let error = Dataset::load(&write(&dir, "orders.xlsx", "")).unwrap_err();
    assert!(error.to_string().contains("unsupported"));
}

#[tokio::test]
async fn filtered_page_renders_from_file_backed_grid() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&write(&dir, "orders.csv", ORDERS)).unwrap();
    let storage = Rc::new(FileStore::open(dir.path().join("grid-storage.json")));

    let grid = DataGrid::builder(HistoryStore::shared(MemoryNavigation::new()), storage)
        .grid_id("orders")
        .columns(dataset.columns)
        .source(GridSource::from_data(dataset.rows))
        .settings(GridSettings::immediate())
        .mount()
        .unwrap();

    grid.set_quick_filter(
        "city",
        Some(FilterValue::Many(vec!["Oslo".into(), "Bergen".into()])),
    )
    .unwrap();
    grid.set_page_size(3).unwrap();
    grid.load().await.unwrap();

    let page = grid.page();
    assert_eq!(page.total_records, Some(4));
    assert_eq!(page.total_pages, 2);

    assert!(grid.set_column_visible_by_key("total", false));
    let columns = grid.visible_columns();
    let displayed = grid.displayed();
    let (sort_key, direction) = grid.sort_state();
    let rendered =
        page_table(&columns, displayed.rows(), (sort_key.as_deref(), direction)).to_string();

    assert!(rendered.contains("Id ▼"));
    assert!(!rendered.contains("Tromso"));
    assert!(!rendered.contains("Total"));
    assert_eq!(
        page_footer(displayed.page(), grid.mode()),
        "Page 1 of 2 · records 1-3 of 4 · filter: list"
    );
    assert_eq!(grid.mode(), FilterMode::List);
    assert!(dir.path().join("grid-storage.json").exists());
}
