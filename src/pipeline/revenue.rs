//! Stage 1: net revenue projection
//!
//! Keeps only lines of completed orders and attaches their net revenue.
//! Every later stage reads this projection, so the completed-only rule is
//! enforced once here and inherited by everything downstream.

use crate::model::{CustomerId, OrderId, OrderLine, ProductId};
use chrono::NaiveDate;

/// A completed order line with its net revenue
#[derive(Debug, Clone, PartialEq)]
pub struct NetRevenueLine {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub order_date: NaiveDate,
    pub net_revenue: f64,
    pub quantity: i64,
}

/// `quantity * unit_price - discount_amount`, not clamped at zero
pub fn net_revenue(line: &OrderLine) -> f64 {
    line.quantity as f64 * line.unit_price - line.discount_amount
}

/// Project completed lines; lines of any other status are dropped, not zeroed.
pub fn project(lines: &[OrderLine]) -> Vec<NetRevenueLine> {
    lines
        .iter()
        .filter(|line| line.status.is_completed())
        .map(|line| NetRevenueLine {
            order_id: line.order_id,
            customer_id: line.customer_id,
            product_id: line.product_id,
            order_date: line.order_date,
            net_revenue: net_revenue(line),
            quantity: line.quantity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderStatus;

    fn line(status: OrderStatus, quantity: i64, unit_price: f64, discount: f64) -> OrderLine {
        OrderLine {
            order_id: 1,
            customer_id: 7,
            product_id: 3,
            order_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            status,
            quantity,
            unit_price,
            discount_amount: discount,
        }
    }

    #[test]
    fn test_net_revenue_subtracts_discount() {
        let l = line(OrderStatus::Completed, 3, 10.00, 5.00);
        assert!((net_revenue(&l) - 25.00).abs() < 1e-9);
    }

    #[test]
    fn test_discount_above_price_goes_negative() {
        let l = line(OrderStatus::Completed, 1, 10.00, 12.50);
        assert!((net_revenue(&l) + 2.50).abs() < 1e-9);
    }

    #[test]
    fn test_project_drops_non_completed() {
        let lines = vec![
            line(OrderStatus::Completed, 1, 20.0, 0.0),
            line(OrderStatus::Cancelled, 1, 99.0, 0.0),
            line(OrderStatus::Other("Lost".into()), 1, 99.0, 0.0),
        ];
        let projected = project(&lines);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].net_revenue, 20.0);
        assert_eq!(projected[0].quantity, 1);
    }

    #[test]
    fn test_project_empty() {
        assert!(project(&[]).is_empty());
    }
}
