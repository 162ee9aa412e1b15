// =============================================================================
// Result Presenter — pure view of the current state
// =============================================================================
//
// `present` derives a `Screen` from a `ViewState` snapshot and nothing else;
// `Screen::render_text` turns it into terminal output. The error paragraph
// and the table are gated independently: the table shows whenever the
// dataset has rows, unless `show_stale_rows_on_error` is off and an error is
// active.
// =============================================================================

use colored::Colorize;
use serde_json::Value;

use crate::types::{StockRow, ViewState};

pub const TITLE: &str = "Stock Tracker";

/// Header labels, in column order.
pub const COLUMN_LABELS: [&str; 7] = ["Date", "Close", "SMA_50", "Upper BB", "Lower BB", "%K", "%D"];

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Position in the dataset; rows have no other identity.
    pub key: usize,
    pub cells: [String; 7],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub symbol: String,
    pub error: Option<String>,
    pub table: Option<Vec<TableRow>>,
}

/// Build the screen for `view`.
pub fn present(view: &ViewState, show_stale_rows_on_error: bool) -> Screen {
    let error = view.status.error_message().map(str::to_string);
    let rows = view.status.dataset();

    let table = if rows.is_empty() || (error.is_some() && !show_stale_rows_on_error) {
        None
    } else {
        Some(rows.iter().enumerate().map(|(key, row)| table_row(key, row)).collect())
    };

    Screen {
        symbol: view.symbol.clone(),
        error,
        table,
    }
}

fn table_row(key: usize, row: &StockRow) -> TableRow {
    TableRow {
        key,
        cells: row.cells().map(format_cell),
    }
}

/// Render one cell: missing, null and boolean values are blank, strings are
/// verbatim, numbers print integral values without a fraction.
pub fn format_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(_)) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
                        format!("{f:.0}")
                    }
                    Some(f) => f.to_string(),
                    None => n.to_string(),
                }
            }
        }
        Some(other) => other.to_string(),
    }
}

impl Screen {
    /// Plain-text rendering; the error line is red when `color` is set.
    pub fn render_text(&self, color: bool) -> String {
        let mut out = String::new();
        out.push_str(TITLE);
        out.push('\n');
        out.push_str(&format!("Symbol: {}\n", self.symbol));

        if let Some(err) = &self.error {
            out.push('\n');
            if color {
                out.push_str(&err.red().to_string());
            } else {
                out.push_str(err);
            }
            out.push('\n');
        }

        if let Some(rows) = &self.table {
            out.push('\n');
            out.push_str(&render_table(rows));
        }

        out
    }
}

fn render_table(rows: &[TableRow]) -> String {
    let mut widths = COLUMN_LABELS.map(|l| l.chars().count());
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.cells.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let border = {
        let mut line = String::from("+");
        for w in &widths {
            line.push_str(&"-".repeat(w + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };

    let mut out = border.clone();
    out.push_str(&table_line(COLUMN_LABELS.iter().copied(), &widths));
    out.push_str(&border);
    for row in rows {
        out.push_str(&table_line(row.cells.iter().map(String::as_str), &widths));
    }
    out.push_str(&border);
    out
}

fn table_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize; 7]) -> String {
    let mut line = String::from("|");
    for (cell, w) in cells.zip(widths.iter()) {
        let pad = w - cell.chars().count();
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(pad + 1));
        line.push('|');
    }
    line.push('\n');
    line
}
