//! Stage 4: customer lifetime value and frequency segmentation

use super::revenue::NetRevenueLine;
use crate::model::{CustomerId, OrderId};
use crate::util::ratio;
use anyhow::{bail, Result};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Frequency buckets
// ─────────────────────────────────────────────────────────────────────────────

/// Order-frequency class. Declaration order is the bucket order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrequencySegment {
    OneTime,
    Low,
    Medium,
    High,
}

impl FrequencySegment {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OneTime => "One-time Customer",
            Self::Low => "Low Frequency",
            Self::Medium => "Medium Frequency",
            Self::High => "High Frequency",
        }
    }
}

impl fmt::Display for FrequencySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower bounds (inclusive) of the Low, Medium and High buckets.
///
/// Exactly one order is always "One-time"; the rest is first match wins
/// from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyThresholds {
    low_min: u64,
    medium_min: u64,
    high_min: u64,
}

impl Default for FrequencyThresholds {
    fn default() -> Self {
        Self {
            low_min: 2,
            medium_min: 4,
            high_min: 7,
        }
    }
}

impl FrequencyThresholds {
    /// Bounds must satisfy `2 <= low_min < medium_min < high_min`
    pub fn new(low_min: u64, medium_min: u64, high_min: u64) -> Result<Self> {
        if low_min < 2 {
            bail!("low_frequency_min must be at least 2 (1 order is always one-time), got {low_min}");
        }
        if !(low_min < medium_min && medium_min < high_min) {
            bail!(
                "frequency thresholds must be strictly increasing, got low={low_min} medium={medium_min} high={high_min}"
            );
        }
        Ok(Self {
            low_min,
            medium_min,
            high_min,
        })
    }

    pub fn low_min(&self) -> u64 {
        self.low_min
    }

    pub fn medium_min(&self) -> u64 {
        self.medium_min
    }

    pub fn high_min(&self) -> u64 {
        self.high_min
    }

    /// Bucket for an order count. `None` only for zero orders.
    pub fn classify(&self, order_count: u64) -> Option<FrequencySegment> {
        match order_count {
            0 => None,
            n if n >= self.high_min => Some(FrequencySegment::High),
            n if n >= self.medium_min => Some(FrequencySegment::Medium),
            n if n >= self.low_min => Some(FrequencySegment::Low),
            _ => Some(FrequencySegment::OneTime),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-customer lifetime metrics
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerLtvRecord {
    pub customer_id: CustomerId,
    pub total_orders: u64,
    pub total_revenue: f64,
    /// Mean net revenue per order *line*, not per order
    pub avg_order_value: f64,
    pub lifespan_days: i64,
    pub first_order_date: NaiveDate,
    pub last_order_date: NaiveDate,
    /// Relative to the run's as-of date; negative if the as-of date is earlier
    pub days_since_last_order: i64,
    pub segment: FrequencySegment,
}

/// Aggregate one record per customer with at least one completed line.
///
/// Output is ordered by customer id.
pub fn customer_records(
    lines: &[NetRevenueLine],
    thresholds: &FrequencyThresholds,
    as_of: NaiveDate,
) -> Vec<CustomerLtvRecord> {
    struct Totals {
        orders: BTreeSet<OrderId>,
        revenue: f64,
        line_count: u64,
        first: NaiveDate,
        last: NaiveDate,
    }

    let mut by_customer: BTreeMap<CustomerId, Totals> = BTreeMap::new();
    for line in lines {
        let totals = by_customer.entry(line.customer_id).or_insert_with(|| Totals {
            orders: BTreeSet::new(),
            revenue: 0.0,
            line_count: 0,
            first: line.order_date,
            last: line.order_date,
        });
        totals.orders.insert(line.order_id);
        totals.revenue += line.net_revenue;
        totals.line_count += 1;
        totals.first = totals.first.min(line.order_date);
        totals.last = totals.last.max(line.order_date);
    }

    by_customer
        .into_iter()
        .filter_map(|(customer_id, totals)| {
            let total_orders = totals.orders.len() as u64;
            let segment = thresholds.classify(total_orders)?;
            Some(CustomerLtvRecord {
                customer_id,
                total_orders,
                total_revenue: totals.revenue,
                // line_count >= 1 for every entry in the map
                avg_order_value: totals.revenue / totals.line_count as f64,
                lifespan_days: (totals.last - totals.first).num_days() + 1,
                first_order_date: totals.first,
                last_order_date: totals.last,
                days_since_last_order: (as_of - totals.last).num_days(),
                segment,
            })
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Segment aggregates
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LtvSegment {
    pub segment: FrequencySegment,
    pub customer_count: u64,
    pub avg_ltv: f64,
    pub avg_order_value: f64,
    pub avg_order_frequency: f64,
    pub avg_lifespan_days: f64,
    pub total_segment_revenue: f64,
}

/// Roll customer records up into their buckets, highest average LTV first.
///
/// Empty buckets are not emitted, so every average has a non-zero denominator.
pub fn segment(records: &[CustomerLtvRecord]) -> Vec<LtvSegment> {
    #[derive(Default)]
    struct Acc {
        customers: u64,
        revenue: f64,
        order_value: f64,
        orders: u64,
        lifespan: i64,
    }

    let mut buckets: BTreeMap<FrequencySegment, Acc> = BTreeMap::new();
    for record in records {
        let acc = buckets.entry(record.segment).or_default();
        acc.customers += 1;
        acc.revenue += record.total_revenue;
        acc.order_value += record.avg_order_value;
        acc.orders += record.total_orders;
        acc.lifespan += record.lifespan_days;
    }

    let mut segments: Vec<LtvSegment> = buckets
        .into_iter()
        .filter_map(|(segment, acc)| {
            let n = acc.customers as f64;
            Some(LtvSegment {
                segment,
                customer_count: acc.customers,
                avg_ltv: ratio(acc.revenue, n)?,
                avg_order_value: ratio(acc.order_value, n)?,
                avg_order_frequency: ratio(acc.orders as f64, n)?,
                avg_lifespan_days: ratio(acc.lifespan as f64, n)?,
                total_segment_revenue: acc.revenue,
            })
        })
        .collect();

    segments.sort_by(|a, b| {
        b.avg_ltv
            .total_cmp(&a.avg_ltv)
            .then(a.segment.cmp(&b.segment))
    });
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn line(customer_id: CustomerId, order_id: OrderId, order_date: NaiveDate, net: f64) -> NetRevenueLine {
        NetRevenueLine {
            order_id,
            customer_id,
            product_id: 1,
            order_date,
            net_revenue: net,
            quantity: 1,
        }
    }

    fn as_of() -> NaiveDate {
        date(2024, 12, 31)
    }

    #[test]
    fn test_bucket_boundaries() {
        let t = FrequencyThresholds::default();
        let expected = [
            (1, FrequencySegment::OneTime),
            (2, FrequencySegment::Low),
            (3, FrequencySegment::Low),
            (4, FrequencySegment::Medium),
            (6, FrequencySegment::Medium),
            (7, FrequencySegment::High),
            (40, FrequencySegment::High),
        ];
        for (count, segment) in expected {
            assert_eq!(t.classify(count), Some(segment), "count {count}");
        }
        assert_eq!(t.classify(0), None);
    }

    #[test]
    fn test_thresholds_validation() {
        assert!(FrequencyThresholds::new(2, 4, 7).is_ok());
        assert!(FrequencyThresholds::new(1, 4, 7).is_err());
        assert!(FrequencyThresholds::new(3, 3, 7).is_err());
        assert!(FrequencyThresholds::new(2, 8, 7).is_err());
    }

    #[test]
    fn test_single_order_customer() {
        let lines = vec![line(1, 100, date(2024, 6, 1), 250.0)];
        let records = customer_records(&lines, &FrequencyThresholds::default(), as_of());

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.total_orders, 1);
        assert_eq!(r.lifespan_days, 1);
        assert_eq!(r.segment, FrequencySegment::OneTime);
        assert_eq!(r.days_since_last_order, 213);

        let segments = segment(&records);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].segment.label(), "One-time Customer");
        assert_eq!(segments[0].total_segment_revenue, 250.0);
    }

    #[test]
    fn test_avg_order_value_is_line_level() {
        // Two orders: one with three lines, one with a single line
        let lines = vec![
            line(1, 100, date(2024, 1, 1), 10.0),
            line(1, 100, date(2024, 1, 1), 10.0),
            line(1, 100, date(2024, 1, 1), 10.0),
            line(1, 101, date(2024, 1, 10), 30.0),
        ];
        let records = customer_records(&lines, &FrequencyThresholds::default(), as_of());
        let r = &records[0];

        assert_eq!(r.total_orders, 2);
        assert_eq!(r.total_revenue, 60.0);
        // 60 / 4 lines, not 60 / 2 orders
        assert_eq!(r.avg_order_value, 15.0);
        assert_eq!(r.lifespan_days, 10);
        assert_eq!(r.segment, FrequencySegment::Low);
    }

    #[test]
    fn test_bucket_counts_cover_every_customer() {
        let mut lines = Vec::new();
        let mut order_id = 0;
        // customer n places n orders, for n in 1..=9
        for customer in 1..=9 {
            for k in 0..customer {
                order_id += 1;
                lines.push(line(customer, order_id, date(2024, 1, 1 + k as u32), 5.0));
            }
        }
        let records = customer_records(&lines, &FrequencyThresholds::default(), as_of());
        let segments = segment(&records);

        let total: u64 = segments.iter().map(|s| s.customer_count).sum();
        assert_eq!(total, 9);

        let count_of = |seg: FrequencySegment| {
            segments
                .iter()
                .find(|s| s.segment == seg)
                .map(|s| s.customer_count)
                .unwrap_or(0)
        };
        assert_eq!(count_of(FrequencySegment::OneTime), 1);
        assert_eq!(count_of(FrequencySegment::Low), 2);
        assert_eq!(count_of(FrequencySegment::Medium), 3);
        assert_eq!(count_of(FrequencySegment::High), 3);
    }

    #[test]
    fn test_segments_sorted_by_avg_ltv_desc() {
        let lines = vec![
            line(1, 1, date(2024, 1, 1), 500.0),
            line(2, 2, date(2024, 1, 1), 10.0),
            line(2, 3, date(2024, 2, 1), 10.0),
        ];
        let records = customer_records(&lines, &FrequencyThresholds::default(), as_of());
        let segments = segment(&records);

        assert_eq!(segments[0].segment, FrequencySegment::OneTime);
        assert_eq!(segments[1].segment, FrequencySegment::Low);
        assert_eq!(segments[1].avg_order_frequency, 2.0);
        assert_eq!(segments[1].avg_lifespan_days, 32.0);
    }

    #[test]
    fn test_no_customers_no_segments() {
        assert!(segment(&[]).is_empty());
    }
}
