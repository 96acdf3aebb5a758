// Data models for the commerce dataset
//
// These structs map to the rows of the SQLite tables created by
// `store::schema`. The pipeline only reads `OrderLine`; the remaining
// entities exist so the seeder can write a complete dataset.

use chrono::NaiveDate;
use std::fmt;

pub type CustomerId = i64;
pub type OrderId = i64;
pub type ProductId = i64;

/// Lifecycle status of an order as stored in `orders.order_status`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Completed,
    Pending,
    Shipped,
    Cancelled,
    Returned,
    /// Any status string the store holds that we don't recognise.
    /// Treated as non-completed everywhere.
    Other(String),
}

impl OrderStatus {
    /// Statuses the seeder draws from, in the order of `STATUS_WEIGHTS`
    pub const KNOWN: [OrderStatus; 5] = [
        OrderStatus::Completed,
        OrderStatus::Pending,
        OrderStatus::Shipped,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
    ];

    /// Parse a status column value. Matching is exact: "completed" is `Other`.
    pub fn parse(s: &str) -> Self {
        match s {
            "Completed" => Self::Completed,
            "Pending" => Self::Pending,
            "Shipped" => Self::Shipped,
            "Cancelled" => Self::Cancelled,
            "Returned" => Self::Returned,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "Completed",
            Self::Pending => "Pending",
            Self::Shipped => "Shipped",
            Self::Cancelled => "Cancelled",
            Self::Returned => "Returned",
            Self::Other(s) => s,
        }
    }

    /// Only completed orders count towards any aggregate
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One order line joined to its order: the single input relation of the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount_amount: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Seed entities
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub registration_date: NaiveDate,
    pub birth_date: NaiveDate,
    pub gender: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub country: &'static str,
    pub customer_lifetime_value: f64,
}

#[derive(Debug, Clone)]
pub struct Product {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: &'static str,
    pub subcategory: &'static str,
    pub brand: &'static str,
    pub cost_price: f64,
    pub list_price: f64,
}

#[derive(Debug, Clone)]
pub struct MarketingCampaign {
    pub campaign_id: i64,
    pub campaign_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub channel: &'static str,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub order_date: NaiveDate,
    pub ship_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub shipping_cost: f64,
    pub payment_method: &'static str,
}

#[derive(Debug, Clone)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount_amount: f64,
}

#[derive(Debug, Clone)]
pub struct CustomerAcquisition {
    pub customer_id: CustomerId,
    pub campaign_id: i64,
    pub acquisition_date: NaiveDate,
    pub acquisition_cost: f64,
}
