// JSON rendering
//
// One object keyed by table name; each table is an array of row objects
// whose keys follow column order (serde_json `preserve_order`).

use super::{Cell, Table};
use crate::util::round2;
use anyhow::{Context, Result};
use serde_json::{Map, Number, Value};

pub(super) fn render(tables: &[Table]) -> Result<String> {
    let mut root = Map::new();
    for table in tables {
        let rows: Vec<Value> = table
            .rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = table
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| (column.to_string(), to_value(cell)))
                    .collect();
                Value::Object(object)
            })
            .collect();
        root.insert(table.name.to_string(), Value::Array(rows));
    }

    let mut out = serde_json::to_string_pretty(&Value::Object(root))
        .context("Failed to serialize report as JSON")?;
    out.push('\n');
    Ok(out)
}

fn to_value(cell: &Cell) -> Value {
    match cell {
        Cell::Text(s) => Value::String(s.clone()),
        Cell::Int(n) => Value::Number((*n).into()),
        // Non-finite values have no JSON representation
        Cell::Decimal(v) => Number::from_f64(round2(*v)).map_or(Value::Null, Value::Number),
        Cell::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        Cell::Null => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_output;
    use super::super::{tables, ReportKind, TableOptions};
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_tables_keyed_by_name() {
        let output = sample_output();
        let out = render(&tables(ReportKind::All, &output, TableOptions::default())).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();

        let keys: Vec<&String> = parsed.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec![
                "cohort_retention",
                "cohort_revenue",
                "ltv_segments",
                "customer_ltv",
                "monthly_trend"
            ]
        );

        let trend = &parsed["monthly_trend"];
        assert_eq!(trend[0]["month"], "2024-01");
        assert!(trend[0]["mom_growth_percentage"].is_null());
        assert_eq!(trend[1]["mom_growth_percentage"], -79.31);
    }

    #[test]
    fn test_row_keys_follow_column_order() {
        let table = Table {
            name: "t",
            title: "T",
            columns: &["zeta", "alpha", "when"],
            rows: vec![vec![
                Cell::Decimal(1.005_1),
                Cell::Null,
                Cell::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            ]],
        };
        let out = render(&[table]).unwrap();
        let zeta = out.find("\"zeta\"").unwrap();
        let alpha = out.find("\"alpha\"").unwrap();
        assert!(zeta < alpha);

        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["t"][0]["zeta"], 1.01);
        assert!(parsed["t"][0]["alpha"].is_null());
        assert_eq!(parsed["t"][0]["when"], "2024-02-29");
    }

    #[test]
    fn test_non_finite_decimal_is_null() {
        assert_eq!(to_value(&Cell::Decimal(f64::NAN)), Value::Null);
    }
}
