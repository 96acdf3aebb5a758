// Plain-text table rendering
//
// Column widths are measured in terminal cells (unicode-width), not bytes,
// so labels with non-ASCII characters still line up. Numbers are
// right-aligned, everything else left-aligned. NULL renders as "NULL".

use super::{Cell, Table};
use unicode_width::UnicodeWidthStr;

const NULL: &str = "NULL";
const GAP: &str = "  ";

pub(super) fn render(tables: &[Table]) -> String {
    let mut out = String::new();
    for (i, table) in tables.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_table(table, &mut out);
    }
    out
}

fn render_table(table: &Table, out: &mut String) {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|c| c.display().unwrap_or_else(|| NULL.to_string()))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.width()).collect();
    for row in &cells {
        for (w, value) in widths.iter_mut().zip(row) {
            *w = (*w).max(value.width());
        }
    }

    out.push_str(&format!("== {} ({} rows) ==\n", table.title, table.rows.len()));

    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, &w)| pad_right(name, w))
        .collect();
    push_line(out, &header);

    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    push_line(out, &rule);

    for (row, display) in table.rows.iter().zip(&cells) {
        let line: Vec<String> = row
            .iter()
            .zip(display)
            .zip(&widths)
            .map(|((cell, value), &w)| align(cell, value, w))
            .collect();
        push_line(out, &line);
    }
}

fn align(cell: &Cell, value: &str, width: usize) -> String {
    if cell.is_numeric() || matches!(cell, Cell::Null) {
        pad_left(value, width)
    } else {
        pad_right(value, width)
    }
}

fn pad_right(value: &str, width: usize) -> String {
    let fill = width.saturating_sub(value.width());
    format!("{value}{}", " ".repeat(fill))
}

fn pad_left(value: &str, width: usize) -> String {
    let fill = width.saturating_sub(value.width());
    format!("{}{value}", " ".repeat(fill))
}

/// Join with the column gap, trimming trailing padding on the last column
fn push_line(out: &mut String, parts: &[String]) {
    let line = parts.join(GAP);
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table {
            name: "t",
            title: "Sample",
            columns: &["label", "amount"],
            rows: vec![
                vec![Cell::Text("Café".into()), Cell::Decimal(5.0)],
                vec![Cell::Text("Longer label".into()), Cell::Null],
            ],
        }
    }

    #[test]
    fn test_columns_align() {
        let out = render(&[table()]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "== Sample (2 rows) ==");
        assert_eq!(lines[1], "label         amount");
        assert_eq!(lines[2], "------------  ------");
        assert_eq!(lines[3], "Café            5.00");
        assert_eq!(lines[4], "Longer label    NULL");
    }

    #[test]
    fn test_multiple_tables_separated_by_blank_line() {
        let out = render(&[table(), table()]);
        assert_eq!(out.matches("== Sample").count(), 2);
        assert!(out.contains("NULL\n\n== Sample"));
    }
}
