//! Report tables and rendering
//!
//! Pipeline rows are flattened into format-agnostic [`Table`]s of typed
//! [`Cell`]s, then rendered in one go. Rendering happens entirely in memory
//! so a failed run never leaves a half-written file behind.

use crate::pipeline::PipelineOutput;
use clap::ValueEnum;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

mod csv;
mod json;
pub mod sink;
mod text;

pub use sink::ReportSink;

/// Which report to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Cohort retention percentages (significance floor applied)
    Retention,
    /// Cohort revenue with cumulative totals
    Revenue,
    /// Frequency segments with lifetime value aggregates
    Ltv,
    /// Per-customer lifetime value records
    Customers,
    /// Monthly revenue trend with month-over-month growth
    Trends,
    /// Every report above
    All,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retention => "retention",
            Self::Revenue => "revenue",
            Self::Ltv => "ltv",
            Self::Customers => "customers",
            Self::Trends => "trends",
            Self::All => "all",
        }
    }
}

/// Output encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminals and text files
    #[default]
    Text,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// File extension used when saving to the output directory
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}' (expected text, csv or json)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tables
// ─────────────────────────────────────────────────────────────────────────────

/// A single typed value. `Null` marks an undefined aggregate (zero denominator).
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    /// Two-decimal monetary or averaged value
    Decimal(f64),
    Date(NaiveDate),
    Null,
}

impl Cell {
    fn decimal(value: Option<f64>) -> Self {
        value.map_or(Cell::Null, Cell::Decimal)
    }

    fn count(value: u64) -> Self {
        Cell::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }

    /// Display form shared by the text and CSV renderers; `None` for NULL
    fn display(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.clone()),
            Cell::Int(n) => Some(n.to_string()),
            Cell::Decimal(v) => Some(format!("{v:.2}")),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Cell::Null => None,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Cell::Int(_) | Cell::Decimal(_))
    }
}

/// A titled, column-ordered result set
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Stable identifier, used as the JSON key
    pub name: &'static str,
    pub title: &'static str,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<Cell>>,
}

/// Options that shape which rows end up in the tables
#[derive(Debug, Clone, Copy, Default)]
pub struct TableOptions {
    /// Truncate the customer listing to this many rows
    pub customer_limit: Option<usize>,
}

/// Build the tables for `kind` from a pipeline run
pub fn tables(kind: ReportKind, output: &PipelineOutput, options: TableOptions) -> Vec<Table> {
    match kind {
        ReportKind::Retention => vec![retention_table(output)],
        ReportKind::Revenue => vec![revenue_table(output)],
        ReportKind::Ltv => vec![segment_table(output)],
        ReportKind::Customers => vec![customer_table(output, options)],
        ReportKind::Trends => vec![trend_table(output)],
        ReportKind::All => vec![
            retention_table(output),
            revenue_table(output),
            segment_table(output),
            customer_table(output, options),
            trend_table(output),
        ],
    }
}

/// Render tables in the requested format
pub fn render(tables: &[Table], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render(tables)),
        OutputFormat::Csv => Ok(csv::render(tables)),
        OutputFormat::Json => json::render(tables),
    }
}

fn retention_table(output: &PipelineOutput) -> Table {
    Table {
        name: "cohort_retention",
        title: "Cohort Retention",
        columns: &[
            "cohort_month",
            "period_number",
            "customers_active",
            "retention_percentage",
        ],
        rows: output
            .retention
            .iter()
            .map(|r| {
                vec![
                    Cell::Text(r.cohort_month.to_string()),
                    Cell::count(u64::from(r.period_number)),
                    Cell::count(r.customers_active),
                    Cell::decimal(r.retention_percentage),
                ]
            })
            .collect(),
    }
}

fn revenue_table(output: &PipelineOutput) -> Table {
    Table {
        name: "cohort_revenue",
        title: "Cohort Revenue",
        columns: &[
            "cohort_month",
            "period_number",
            "customers_active",
            "total_revenue",
            "avg_revenue_per_customer",
            "cumulative_revenue",
        ],
        rows: output
            .revenue
            .iter()
            .map(|r| {
                vec![
                    Cell::Text(r.cohort_month.to_string()),
                    Cell::count(u64::from(r.period_number)),
                    Cell::count(r.customers_active),
                    Cell::Decimal(r.total_revenue),
                    Cell::decimal(r.avg_revenue_per_customer),
                    Cell::Decimal(r.cumulative_revenue),
                ]
            })
            .collect(),
    }
}

fn segment_table(output: &PipelineOutput) -> Table {
    Table {
        name: "ltv_segments",
        title: "Customer LTV Segments",
        columns: &[
            "customer_segment",
            "customer_count",
            "avg_ltv",
            "avg_order_value",
            "avg_order_frequency",
            "avg_lifespan_days",
            "total_segment_revenue",
        ],
        rows: output
            .segments
            .iter()
            .map(|s| {
                vec![
                    Cell::Text(s.segment.label().to_string()),
                    Cell::count(s.customer_count),
                    Cell::Decimal(s.avg_ltv),
                    Cell::Decimal(s.avg_order_value),
                    Cell::Decimal(s.avg_order_frequency),
                    Cell::Decimal(s.avg_lifespan_days),
                    Cell::Decimal(s.total_segment_revenue),
                ]
            })
            .collect(),
    }
}

fn customer_table(output: &PipelineOutput, options: TableOptions) -> Table {
    let mut records: Vec<_> = output.customers.iter().collect();
    records.sort_by(|a, b| {
        b.total_revenue
            .total_cmp(&a.total_revenue)
            .then(a.customer_id.cmp(&b.customer_id))
    });
    if let Some(limit) = options.customer_limit {
        records.truncate(limit);
    }

    Table {
        name: "customer_ltv",
        title: "Customer Lifetime Value",
        columns: &[
            "customer_id",
            "total_orders",
            "total_revenue",
            "avg_order_value",
            "lifespan_days",
            "first_order_date",
            "last_order_date",
            "days_since_last_order",
            "customer_segment",
        ],
        rows: records
            .into_iter()
            .map(|c| {
                vec![
                    Cell::Int(c.customer_id),
                    Cell::count(c.total_orders),
                    Cell::Decimal(c.total_revenue),
                    Cell::Decimal(c.avg_order_value),
                    Cell::Int(c.lifespan_days),
                    Cell::Date(c.first_order_date),
                    Cell::Date(c.last_order_date),
                    Cell::Int(c.days_since_last_order),
                    Cell::Text(c.segment.label().to_string()),
                ]
            })
            .collect(),
    }
}

fn trend_table(output: &PipelineOutput) -> Table {
    Table {
        name: "monthly_trend",
        title: "Monthly Revenue Trend",
        columns: &[
            "month",
            "orders",
            "customers",
            "revenue",
            "avg_order_value",
            "mom_growth_percentage",
        ],
        rows: output
            .trends
            .iter()
            .map(|t| {
                vec![
                    Cell::Text(t.month.to_string()),
                    Cell::count(t.orders),
                    Cell::count(t.customers),
                    Cell::Decimal(t.revenue),
                    Cell::decimal(t.avg_order_value),
                    Cell::decimal(t.mom_growth_percentage),
                ]
            })
            .collect(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{OrderLine, OrderStatus};
    use crate::pipeline::ltv::FrequencyThresholds;
    use crate::pipeline::{CohortPipeline, PipelinePolicy};

    pub(crate) fn sample_output() -> PipelineOutput {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let line = |order_id, customer_id, order_date, unit_price| OrderLine {
            order_id,
            customer_id,
            product_id: 1,
            order_date,
            status: OrderStatus::Completed,
            quantity: 1,
            unit_price,
            discount_amount: 0.0,
        };
        let lines = vec![
            line(1, 1, date(2024, 1, 5), 250.0),
            line(2, 2, date(2024, 1, 9), 40.0),
            line(3, 2, date(2024, 2, 9), 60.0),
        ];
        CohortPipeline::new(PipelinePolicy {
            min_cohort_size: 0,
            thresholds: FrequencyThresholds::default(),
            as_of: date(2024, 3, 1),
        })
        .run_lines(&lines)
    }

    #[test]
    fn test_all_builds_every_table() {
        let output = sample_output();
        let names: Vec<&str> = tables(ReportKind::All, &output, TableOptions::default())
            .iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "cohort_retention",
                "cohort_revenue",
                "ltv_segments",
                "customer_ltv",
                "monthly_trend"
            ]
        );
    }

    #[test]
    fn test_rows_match_column_count() {
        let output = sample_output();
        for table in tables(ReportKind::All, &output, TableOptions::default()) {
            for row in &table.rows {
                assert_eq!(row.len(), table.columns.len(), "table {}", table.name);
            }
        }
    }

    #[test]
    fn test_customer_listing_sorted_and_limited() {
        let output = sample_output();
        let table = &tables(
            ReportKind::Customers,
            &output,
            TableOptions {
                customer_limit: Some(1),
            },
        )[0];
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], Cell::Int(1));
        assert_eq!(table.rows[0][2], Cell::Decimal(250.0));
    }

    #[test]
    fn test_first_trend_month_has_null_growth() {
        let output = sample_output();
        let table = &tables(ReportKind::Trends, &output, TableOptions::default())[0];
        assert_eq!(table.rows[0][5], Cell::Null);
        assert_eq!(table.rows[1][5], Cell::Decimal(-79.31));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("txt".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
