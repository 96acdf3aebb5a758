//! Stage 2: cohort assignment
//!
//! A customer's cohort is the month of their first completed order.
//! Customers with no completed order never get an entry, and every
//! downstream lookup treats a missing entry as "exclude" (inner join).

use super::month::YearMonth;
use super::revenue::NetRevenueLine;
use crate::model::CustomerId;
use chrono::NaiveDate;
use std::collections::{btree_map::Entry, BTreeMap, BTreeSet};

/// A customer's first completed order and the cohort month derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CohortAssignment {
    pub customer_id: CustomerId,
    pub first_order_date: NaiveDate,
    pub cohort_month: YearMonth,
}

/// Cohort assignments keyed by customer
#[derive(Debug, Default)]
pub struct CohortTable {
    by_customer: BTreeMap<CustomerId, CohortAssignment>,
}

impl CohortTable {
    pub fn get(&self, customer_id: CustomerId) -> Option<&CohortAssignment> {
        self.by_customer.get(&customer_id)
    }

    pub fn len(&self) -> usize {
        self.by_customer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_customer.is_empty()
    }
}

/// A customer being active (placing a completed order) in a given month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ActivityRecord {
    pub cohort_month: YearMonth,
    pub period_number: u32,
    pub customer_id: CustomerId,
}

/// Take the minimum completed order date per customer.
pub fn assign(lines: &[NetRevenueLine]) -> CohortTable {
    let mut by_customer: BTreeMap<CustomerId, CohortAssignment> = BTreeMap::new();

    for line in lines {
        match by_customer.entry(line.customer_id) {
            Entry::Vacant(slot) => {
                slot.insert(CohortAssignment {
                    customer_id: line.customer_id,
                    first_order_date: line.order_date,
                    cohort_month: YearMonth::of(line.order_date),
                });
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get_mut();
                if line.order_date < current.first_order_date {
                    current.first_order_date = line.order_date;
                    current.cohort_month = YearMonth::of(line.order_date);
                }
            }
        }
    }

    CohortTable { by_customer }
}

/// One record per (customer, active month), with the period number relative
/// to the customer's cohort. Sorted by (cohort, period, customer).
pub fn activity(lines: &[NetRevenueLine], cohorts: &CohortTable) -> Vec<ActivityRecord> {
    let mut records = BTreeSet::new();

    for line in lines {
        let Some(cohort) = cohorts.get(line.customer_id) else {
            continue;
        };
        if let Some(period_number) = period_number(cohort.cohort_month, line.order_date) {
            records.insert(ActivityRecord {
                cohort_month: cohort.cohort_month,
                period_number,
                customer_id: line.customer_id,
            });
        }
    }

    records.into_iter().collect()
}

/// Months between the cohort month and the activity date's month.
///
/// `None` only if the activity predates the cohort, which cannot happen
/// when the cohort was assigned from the same lines.
pub fn period_number(cohort_month: YearMonth, activity_date: NaiveDate) -> Option<u32> {
    u32::try_from(YearMonth::of(activity_date).months_since(cohort_month)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn line(customer_id: CustomerId, order_id: i64, order_date: NaiveDate) -> NetRevenueLine {
        NetRevenueLine {
            order_id,
            customer_id,
            product_id: 1,
            order_date,
            net_revenue: 10.0,
            quantity: 1,
        }
    }

    #[test]
    fn test_assign_uses_earliest_date_regardless_of_input_order() {
        let lines = vec![
            line(1, 10, date(2024, 3, 2)),
            line(1, 11, date(2024, 1, 17)),
            line(2, 12, date(2023, 12, 31)),
        ];
        let table = assign(&lines);

        assert_eq!(table.len(), 2);
        let first = table.get(1).unwrap();
        assert_eq!(first.first_order_date, date(2024, 1, 17));
        assert_eq!(first.cohort_month.to_string(), "2024-01");
        assert_eq!(table.get(2).unwrap().cohort_month.to_string(), "2023-12");
    }

    #[test]
    fn test_customer_without_lines_has_no_cohort() {
        let table = assign(&[line(1, 10, date(2024, 1, 1))]);
        assert!(table.get(99).is_none());
    }

    #[test]
    fn test_activity_is_distinct_per_customer_month() {
        let lines = vec![
            line(1, 10, date(2024, 1, 3)),
            line(1, 10, date(2024, 1, 3)),
            line(1, 11, date(2024, 1, 28)),
            line(1, 12, date(2024, 4, 9)),
        ];
        let table = assign(&lines);
        let records = activity(&lines, &table);

        let periods: Vec<u32> = records.iter().map(|r| r.period_number).collect();
        assert_eq!(periods, vec![0, 3]);
    }

    #[test]
    fn test_period_number_across_year_boundary() {
        let cohort = YearMonth::of(date(2023, 12, 15));
        assert_eq!(period_number(cohort, date(2024, 1, 1)), Some(1));
        assert_eq!(period_number(cohort, date(2025, 12, 31)), Some(24));
        assert_eq!(period_number(cohort, date(2023, 11, 30)), None);
    }
}
