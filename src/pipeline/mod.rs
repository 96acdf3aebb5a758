//! Cohort analytics pipeline
//!
//! Turns raw order lines into the cohort, revenue and LTV tables. Each stage
//! owns its output and only borrows what earlier stages produced, so a run
//! is a pure function of the lines it was given.
//!
//! # Architecture
//!
//! ```text
//! LineSource (SQLite store, or a Vec in tests)
//!     │
//!     └──→ revenue::project          completed lines + net revenue
//!             │
//!             ├──→ cohort::assign    first completed month per customer
//!             │       │
//!             │       ├──→ retention::retention_table   (floor applied)
//!             │       └──→ retention::revenue_table     (running totals)
//!             │
//!             ├──→ ltv::customer_records ──→ ltv::segment
//!             └──→ trends::monthly_trend
//! ```

use crate::model::OrderLine;
use anyhow::{Context, Result};
use chrono::NaiveDate;

pub mod cohort;
pub mod ltv;
pub mod month;
pub mod retention;
pub mod revenue;
pub mod trends;

use ltv::{CustomerLtvRecord, FrequencyThresholds, LtvSegment};
use retention::{CohortRetentionRow, CohortRevenueRow};
use trends::MonthlyTrendRow;

/// Anything that can hand the pipeline the full set of order lines.
///
/// Implementations are read-only. Lines of every status must be returned;
/// filtering to completed orders is the pipeline's job.
pub trait LineSource {
    /// Human-readable name for logging
    fn name(&self) -> &str;

    /// Load every order line joined to its order
    fn order_lines(&self) -> Result<Vec<OrderLine>>;
}

impl LineSource for Vec<OrderLine> {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn order_lines(&self) -> Result<Vec<OrderLine>> {
        Ok(self.clone())
    }
}

/// Policy knobs for a run
#[derive(Debug, Clone, Copy)]
pub struct PipelinePolicy {
    /// Cohorts smaller than this at period 0 are left out of the retention table
    pub min_cohort_size: u64,
    pub thresholds: FrequencyThresholds,
    /// Reference date for `days_since_last_order`; pin it for reproducible output
    pub as_of: NaiveDate,
}

/// Everything one run produces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub retention: Vec<CohortRetentionRow>,
    pub revenue: Vec<CohortRevenueRow>,
    pub customers: Vec<CustomerLtvRecord>,
    pub segments: Vec<LtvSegment>,
    pub trends: Vec<MonthlyTrendRow>,
}

pub struct CohortPipeline {
    policy: PipelinePolicy,
}

impl CohortPipeline {
    pub fn new(policy: PipelinePolicy) -> Self {
        Self { policy }
    }

    /// Load lines from `source` and run every stage.
    ///
    /// A source failure aborts the run; nothing is computed from partial data.
    pub fn run(&self, source: &dyn LineSource) -> Result<PipelineOutput> {
        let lines = source
            .order_lines()
            .with_context(|| format!("Failed to load order lines from {}", source.name()))?;
        tracing::info!("Loaded {} order lines from {}", lines.len(), source.name());
        Ok(self.run_lines(&lines))
    }

    /// Run every stage over lines already in memory
    pub fn run_lines(&self, lines: &[OrderLine]) -> PipelineOutput {
        let projected = revenue::project(lines);
        tracing::debug!(
            "Net revenue projection: {} of {} lines completed",
            projected.len(),
            lines.len()
        );

        let cohorts = cohort::assign(&projected);
        tracing::debug!("Cohort assignment: {} customers", cohorts.len());
        if cohorts.is_empty() {
            // No completed order anywhere, so every table is empty
            tracing::info!("No completed orders; all report tables are empty");
            return PipelineOutput::default();
        }

        let activity = cohort::activity(&projected, &cohorts);
        let retention = retention::retention_table(&activity, self.policy.min_cohort_size);
        let revenue = retention::revenue_table(&projected, &cohorts);
        tracing::debug!(
            "Cohort tables: {} retention rows (floor {}), {} revenue rows",
            retention.len(),
            self.policy.min_cohort_size,
            revenue.len()
        );

        let customers =
            ltv::customer_records(&projected, &self.policy.thresholds, self.policy.as_of);
        let segments = ltv::segment(&customers);
        tracing::debug!(
            "LTV: {} customers in {} segments",
            customers.len(),
            segments.len()
        );

        let trends = trends::monthly_trend(&projected);

        PipelineOutput {
            retention,
            revenue,
            customers,
            segments,
            trends,
        }
    }
}
