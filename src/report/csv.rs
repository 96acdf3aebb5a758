// CSV rendering (RFC 4180 quoting)
//
// Each table is written as a header row followed by its data rows. Multiple
// tables are separated by a blank line. NULL is an empty field.

use super::Table;

pub(super) fn render(tables: &[Table]) -> String {
    let mut out = String::new();
    for (i, table) in tables.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }

        let header: Vec<String> = table.columns.iter().map(|c| escape(c)).collect();
        push_record(&mut out, &header);

        for row in &table.rows {
            let fields: Vec<String> = row
                .iter()
                .map(|cell| cell.display().map(|v| escape(&v)).unwrap_or_default())
                .collect();
            push_record(&mut out, &fields);
        }
    }
    out
}

fn push_record(out: &mut String, fields: &[String]) {
    out.push_str(&fields.join(","));
    out.push_str("\r\n");
}

/// Quote a field when it contains a delimiter, quote or line break
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_output;
    use super::super::{tables, Cell, ReportKind, TableOptions};
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_retention_csv() {
        let output = sample_output();
        let out = render(&tables(ReportKind::Retention, &output, TableOptions::default()));
        let records: Vec<&str> = out.split("\r\n").collect();

        assert_eq!(
            records[0],
            "cohort_month,period_number,customers_active,retention_percentage"
        );
        assert_eq!(records[1], "2024-01,0,2,100.00");
        assert_eq!(records[2], "2024-01,1,1,50.00");
    }

    #[test]
    fn test_null_is_empty_field() {
        let table = Table {
            name: "t",
            title: "T",
            columns: &["a", "b", "c"],
            rows: vec![vec![Cell::Int(1), Cell::Null, Cell::Text("x, y".into())]],
        };
        assert_eq!(render(&[table]), "a,b,c\r\n1,,\"x, y\"\r\n");
    }
}
