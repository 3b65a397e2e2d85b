//! Aligned text table for combos

use crate::case::CaseTable;
use crate::condition::{parse, Combo};
use crate::error::Result;

const CELL_SEPARATOR: &str = " | ";
const RULE_SEPARATOR: &str = "-+-";

/// Display width of each column: the widest of its header and cells
pub fn column_widths<S: AsRef<str>>(combos: &[Combo], columns: &[S]) -> Vec<usize> {
    columns
        .iter()
        .map(|col| {
            let col = col.as_ref();
            combos
                .iter()
                .map(|combo| combo.get(col).map(|v| v.chars().count()).unwrap_or(0))
                .fold(col.chars().count(), usize::max)
        })
        .collect()
}

/// Render combos as a header row, a dash rule and one row per combo.
///
/// Cells are left-justified to the column width and missing cells are
/// empty. An empty combo list renders as an empty string.
pub fn render_table<S: AsRef<str>>(combos: &[Combo], columns: &[S]) -> String {
    if combos.is_empty() {
        return String::new();
    }

    let widths = column_widths(combos, columns);
    let mut out = String::new();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(col, &w)| pad(col.as_ref(), w))
        .collect();
    out.push_str(&header.join(CELL_SEPARATOR));
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&rule.join(RULE_SEPARATOR));
    out.push('\n');

    for combo in combos {
        let row: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(col, &w)| pad(combo.get(col.as_ref()).unwrap_or(""), w))
            .collect();
        out.push_str(&row.join(CELL_SEPARATOR));
        out.push('\n');
    }

    out
}

/// Parse, expand and render a bare condition with its first-seen column order
pub fn render_condition(condition: &str) -> Result<String> {
    let ast = parse(condition)?;
    Ok(CaseTable::from_condition(&ast).render())
}

fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}
