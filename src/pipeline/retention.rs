//! Stage 3: retention and revenue cohort tables
//!
//! Both tables are keyed by (cohort month, period number) and emitted in
//! that order. The retention table is normalised against each cohort's
//! period-0 size and suppresses cohorts below the significance floor; the
//! revenue table has no floor and carries a running total per cohort.

use super::cohort::{period_number, ActivityRecord, CohortTable};
use super::month::YearMonth;
use super::revenue::NetRevenueLine;
use crate::model::CustomerId;
use crate::util::{percentage, ratio};
use std::collections::{BTreeMap, BTreeSet};

/// Distinct active customers per (cohort, period) and their share of the cohort
#[derive(Debug, Clone, PartialEq)]
pub struct CohortRetentionRow {
    pub cohort_month: YearMonth,
    pub period_number: u32,
    pub customers_active: u64,
    /// `None` when the cohort's period-0 size is zero
    pub retention_percentage: Option<f64>,
}

/// Revenue per (cohort, period) with the cohort's cumulative total so far
#[derive(Debug, Clone, PartialEq)]
pub struct CohortRevenueRow {
    pub cohort_month: YearMonth,
    pub period_number: u32,
    pub customers_active: u64,
    pub total_revenue: f64,
    pub avg_revenue_per_customer: Option<f64>,
    pub cumulative_revenue: f64,
}

/// Build the retention table from activity records.
///
/// Cohorts whose period-0 size is below `min_cohort_size` are left out
/// entirely rather than reported as zero.
pub fn retention_table(
    activity: &[ActivityRecord],
    min_cohort_size: u64,
) -> Vec<CohortRetentionRow> {
    let mut active: BTreeMap<(YearMonth, u32), BTreeSet<CustomerId>> = BTreeMap::new();
    for record in activity {
        active
            .entry((record.cohort_month, record.period_number))
            .or_default()
            .insert(record.customer_id);
    }

    let cohort_sizes: BTreeMap<YearMonth, u64> = active
        .iter()
        .filter(|((_, period), _)| *period == 0)
        .map(|((cohort, _), customers)| (*cohort, customers.len() as u64))
        .collect();

    active
        .into_iter()
        .filter_map(|((cohort_month, period_number), customers)| {
            let size = cohort_sizes.get(&cohort_month).copied().unwrap_or(0);
            if size < min_cohort_size {
                return None;
            }
            let customers_active = customers.len() as u64;
            Some(CohortRetentionRow {
                cohort_month,
                period_number,
                customers_active,
                retention_percentage: percentage(customers_active as f64, size as f64),
            })
        })
        .collect()
}

/// Build the revenue table from completed lines.
///
/// Lines of customers without a cohort are skipped (inner-join semantics).
pub fn revenue_table(lines: &[NetRevenueLine], cohorts: &CohortTable) -> Vec<CohortRevenueRow> {
    #[derive(Default)]
    struct PeriodTotals {
        customers: BTreeSet<CustomerId>,
        revenue: f64,
    }

    // cohort -> period -> totals; the inner map keeps periods sorted for the fold
    let mut grouped: BTreeMap<YearMonth, BTreeMap<u32, PeriodTotals>> = BTreeMap::new();
    for line in lines {
        let Some(cohort) = cohorts.get(line.customer_id) else {
            continue;
        };
        let Some(period) = period_number(cohort.cohort_month, line.order_date) else {
            continue;
        };
        let totals = grouped
            .entry(cohort.cohort_month)
            .or_default()
            .entry(period)
            .or_default();
        totals.customers.insert(line.customer_id);
        totals.revenue += line.net_revenue;
    }

    let mut rows = Vec::new();
    for (cohort_month, periods) in grouped {
        let mut running = 0.0;
        for (period_number, totals) in periods {
            running += totals.revenue;
            let customers_active = totals.customers.len() as u64;
            rows.push(CohortRevenueRow {
                cohort_month,
                period_number,
                customers_active,
                total_revenue: totals.revenue,
                avg_revenue_per_customer: ratio(totals.revenue, customers_active as f64),
                cumulative_revenue: running,
            });
        }
    }
    rows
}
