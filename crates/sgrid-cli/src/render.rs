//! Terminal rendering of grid pages and column layouts.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sgrid_core::SortDirection;
use sgrid_model::{ColumnDescriptor, FilterMode, GridRow, Page};

/// Build the table for one displayed page.
///
/// `sort` is the active sort column and direction; that header gets a marker.
pub fn page_table<'a, R: GridRow + 'a>(
    columns: &[ColumnDescriptor],
    rows: impl IntoIterator<Item = &'a R>,
    sort: (Option<&str>, SortDirection),
) -> Table {
    let mut table = Table::new();
    table.set_header(
        columns
            .iter()
            .map(|column| {
                let marker = match sort {
                    (Some(key), direction) if key == column.key => match direction {
                        SortDirection::Ascending => " ▲",
                        SortDirection::Descending => " ▼",
                    },
                    _ => "",
                };
                header_cell(&format!("{}{marker}", column.label))
            })
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);

    let mut empty = true;
    for row in rows {
        empty = false;
        table.add_row(
            columns
                .iter()
                .map(|column| match row.field(&column.key) {
                    Some(value) => Cell::new(value),
                    None => dim_cell("-"),
                })
                .collect::<Vec<_>>(),
        );
    }
    if empty && !columns.is_empty() {
        let mut cells = vec![dim_cell("No records")];
        cells.extend((1..columns.len()).map(|_| Cell::new("")));
        table.add_row(cells);
    }
    table
}

/// Pagination line shown under the page, e.g.
/// `Page 2 of 5 · records 11-20 of 48 · filter: list`.
pub fn page_footer<R>(page: &Page<R>, mode: FilterMode) -> String {
    let (start, end) = page.record_range();
    let mut footer = format!("Page {} of {}", page.current_page, page.total_pages);
    match page.total_records {
        Some(total) => footer.push_str(&format!(" · records {start}-{end} of {total}")),
        None => footer.push_str(&format!(" · records {start}-{end}")),
    }
    if mode != FilterMode::None {
        footer.push_str(&format!(" · filter: {mode}"));
    }
    footer
}

/// Columns in display order with their visibility and quick filter.
pub fn columns_table(columns: &[ColumnDescriptor], order: &[usize], visible: &[usize]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Key"),
        header_cell("Label"),
        header_cell("Visible"),
        header_cell("Quick filter"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);

    for &index in order {
        let Some(column) = columns.get(index) else {
            continue;
        };
        let shown = visible.contains(&index);
        let visible_cell = if shown {
            Cell::new("yes").fg(Color::Green)
        } else {
            dim_cell("no")
        };
        let filter_cell = match &column.filter {
            Some(spec) => {
                let values: Vec<&str> = spec.options.iter().map(|o| o.value.as_str()).collect();
                Cell::new(values.join(", "))
            }
            None => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(index),
            Cell::new(&column.key),
            Cell::new(&column.label),
            visible_cell,
            filter_cell,
        ]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("name", "Name").sortable(),
            ColumnDescriptor::new("city", "City"),
        ]
    }

    #[test]
    fn header_marks_sorted_column() {
        let rows = [json!({"name": "Acme", "city": "Oslo"})];
        let table = page_table(
            &columns(),
            rows.iter(),
            (Some("name"), SortDirection::Ascending),
        );
        let rendered = table.to_string();
        assert!(rendered.contains("Name ▲"));
        assert!(!rendered.contains("City ▲"));
        assert!(rendered.contains("Acme"));
    }

    #[test]
    fn empty_page_says_so() {
        let rows: Vec<Value> = Vec::new();
        let table = page_table(&columns(), rows.iter(), (None, SortDirection::Descending));
        assert!(table.to_string().contains("No records"));
    }

    #[test]
    fn footer_reports_range_and_mode() {
        let page = Page {
            rows: vec![1, 2, 3],
            current_page: 2,
            page_size: 3,
            total_pages: 4,
            total_records: Some(11),
        };
        assert_eq!(
            page_footer(&page, FilterMode::List),
            "Page 2 of 4 · records 4-6 of 11 · filter: list"
        );
        assert_eq!(
            page_footer(&Page::<u8>::empty(10), FilterMode::None),
            "Page 1 of 1 · records 0-0 of 0"
        );
    }
}
