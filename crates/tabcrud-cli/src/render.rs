use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde_json::Value;
use tabcrud::QueryResult;

fn header_cell(name: &str) -> Cell {
    Cell::new(name).add_attribute(Attribute::Bold).fg(Color::Cyan)
}

pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| header_cell(h)).collect::<Vec<_>>());
    table
}

fn value_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::new("NULL").fg(Color::DarkGrey),
        Value::String(s) => Cell::new(s),
        other => Cell::new(other.to_string()),
    }
}

/// Render query rows as a table.
pub fn result_table(result: &QueryResult) -> Table {
    let headers: Vec<&str> = result.column_names.iter().map(String::as_str).collect();
    let mut table = new_table(&headers);
    for row in result.rows() {
        table.add_row(row.into_iter().map(value_cell).collect::<Vec<_>>());
    }
    table
}
