use std::cmp;

use serde_json::Value;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    pub name: &'a str,
    pub align: Align,
}

const INDENT: &str = "  ";
const COLUMN_GAP: &str = "  ";
const DEFAULT_WIDTH: usize = 120;
const MIN_WIDTH: usize = 40;

pub fn terminal_width() -> usize {
    let from_env = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(DEFAULT_WIDTH);
    cmp::max(from_env, MIN_WIDTH)
}

/// Two-decimal amount, or `-` when the value is absent or not a number.
pub fn money(value: Option<&Value>) -> String {
    match value.and_then(Value::as_f64) {
        Some(amount) => format!("{amount:.2}"),
        None => "-".to_string(),
    }
}

pub fn days_until(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "1 day".to_string(),
        _ => format!("{days} days"),
    }
}

pub fn key_value_rows(entries: &[(&str, String)], indent: usize) -> Vec<String> {
    let label_width = entries
        .iter()
        .map(|(label, _)| display_width(label))
        .max()
        .unwrap_or(0);
    let padding = " ".repeat(indent);

    entries
        .iter()
        .map(|(label, value)| format!("{padding}{}  {value}", pad(label, label_width, Align::Left)))
        .collect()
}

/// Aligned table when every row fits in `max_width`, otherwise one labelled
/// block per row. Values are never truncated.
pub fn render_table_or_blocks(
    columns: &[Column<'_>],
    rows: &[Vec<String>],
    max_width: usize,
    block_label: &str,
) -> Vec<String> {
    if columns.is_empty() {
        return Vec::new();
    }

    let widths = column_widths(columns, rows);
    let table_width = INDENT.len()
        + widths.iter().sum::<usize>()
        + COLUMN_GAP.len() * columns.len().saturating_sub(1);
    if table_width > max_width {
        return render_blocks(columns, rows, block_label);
    }

    let header = columns
        .iter()
        .map(|column| column.name.to_string())
        .collect::<Vec<String>>();

    let mut output = Vec::with_capacity(rows.len() + 1);
    output.push(table_line(columns, &header, &widths));
    output.extend(rows.iter().map(|row| table_line(columns, row, &widths)));
    output
}

fn column_widths(columns: &[Column<'_>], rows: &[Vec<String>]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|value| display_width(value))
                .fold(display_width(column.name), cmp::max)
        })
        .collect()
}

fn table_line(columns: &[Column<'_>], cells: &[String], widths: &[usize]) -> String {
    let pieces = columns
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(index, (column, width))| {
            let value = cells.get(index).map(String::as_str).unwrap_or("");
            pad(value, *width, column.align)
        })
        .collect::<Vec<String>>();

    format!("{INDENT}{}", pieces.join(COLUMN_GAP)).trim_end().to_string()
}

fn render_blocks(columns: &[Column<'_>], rows: &[Vec<String>], block_label: &str) -> Vec<String> {
    let labels = columns
        .iter()
        .map(|column| format!("{}:", column.name))
        .collect::<Vec<String>>();
    let label_width = labels
        .iter()
        .map(|label| display_width(label))
        .max()
        .unwrap_or(0);

    let mut output = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        if row_index > 0 {
            output.push(String::new());
        }
        output.push(format!("{INDENT}{block_label} {}:", row_index + 1));
        for (column_index, label) in labels.iter().enumerate() {
            let value = row.get(column_index).map(String::as_str).unwrap_or("");
            output.push(format!(
                "{INDENT}{INDENT}{}  {value}",
                pad(label, label_width, Align::Left)
            ));
        }
    }
    output
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn pad(value: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(display_width(value)));
    match align {
        Align::Left => format!("{value}{fill}"),
        Align::Right => format!("{fill}{value}"),
    }
}
