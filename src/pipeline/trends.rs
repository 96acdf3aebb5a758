//! Monthly revenue trend over completed orders

use super::month::YearMonth;
use super::revenue::NetRevenueLine;
use crate::model::{CustomerId, OrderId};
use crate::util::{percentage, ratio};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTrendRow {
    pub month: YearMonth,
    pub orders: u64,
    pub customers: u64,
    pub revenue: f64,
    /// Revenue per order (order level, unlike the LTV report)
    pub avg_order_value: Option<f64>,
    /// Change against the previous row; `None` for the first row or a zero base
    pub mom_growth_percentage: Option<f64>,
}

pub fn monthly_trend(lines: &[NetRevenueLine]) -> Vec<MonthlyTrendRow> {
    #[derive(Default)]
    struct Acc {
        orders: BTreeSet<OrderId>,
        customers: BTreeSet<CustomerId>,
        revenue: f64,
    }

    let mut months: BTreeMap<YearMonth, Acc> = BTreeMap::new();
    for line in lines {
        let acc = months.entry(YearMonth::of(line.order_date)).or_default();
        acc.orders.insert(line.order_id);
        acc.customers.insert(line.customer_id);
        acc.revenue += line.net_revenue;
    }

    let mut previous: Option<f64> = None;
    months
        .into_iter()
        .map(|(month, acc)| {
            let orders = acc.orders.len() as u64;
            let growth = previous.and_then(|prev| percentage(acc.revenue - prev, prev));
            previous = Some(acc.revenue);
            MonthlyTrendRow {
                month,
                orders,
                customers: acc.customers.len() as u64,
                revenue: acc.revenue,
                avg_order_value: ratio(acc.revenue, orders as f64),
                mom_growth_percentage: growth,
            }
        })
        .collect()
}
