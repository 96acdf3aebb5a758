//! Relational schema for the commerce dataset
//!
//! Six tables mirror the warehouse the reports were written against:
//!
//! ```text
//! customers ─┬─< orders ─< order_items >─ products
//!            └─< customer_acquisition >─ marketing_campaigns
//! ```
//!
//! Dates are stored as ISO-8601 `TEXT` (`YYYY-MM-DD`), which rusqlite's
//! chrono support maps to `NaiveDate` in both directions.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Current schema version, recorded in the `metadata` table
pub const SCHEMA_VERSION: i32 = 1;

/// Tables in dependency order (parents first)
pub const TABLES: [&str; 6] = [
    "customers",
    "products",
    "marketing_campaigns",
    "orders",
    "order_items",
    "customer_acquisition",
];

/// Open (creating if needed) a writable connection for schema and seed work.
///
/// Reports never use this; they go through `CommerceStore::open_read_only`.
pub fn open_writable(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    conn.execute_batch(
        r#"
        PRAGMA foreign_keys=ON;
        PRAGMA synchronous=NORMAL;
        PRAGMA busy_timeout=5000;
        "#,
    )?;

    Ok(conn)
}

/// Read the recorded schema version (0 when the database is empty)
pub fn schema_version(conn: &Connection) -> Result<i32> {
    let has_metadata: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'metadata')",
        [],
        |row| row.get(0),
    )?;
    if !has_metadata {
        return Ok(0);
    }

    let version: Option<i32> = conn.query_row(
        "SELECT CAST(value AS INTEGER) FROM metadata WHERE key = 'schema_version'",
        [],
        |row| row.get(0),
    )
    .or_else(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Ok(None),
        other => Err(other),
    })?;

    Ok(version.unwrap_or(0))
}

/// Create every table and index. Safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<()> {
    if schema_version(conn)? >= SCHEMA_VERSION {
        tracing::debug!("Schema already at v{}", SCHEMA_VERSION);
        return Ok(());
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS metadata (
            key TEXT PRIMARY KEY,
            value TEXT
        );

        CREATE TABLE IF NOT EXISTS customers (
            customer_id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            registration_date TEXT NOT NULL,
            birth_date TEXT,
            gender TEXT,
            city TEXT,
            state TEXT,
            country TEXT DEFAULT 'USA',
            customer_lifetime_value REAL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS products (
            product_id INTEGER PRIMARY KEY,
            product_name TEXT NOT NULL,
            category TEXT NOT NULL,
            subcategory TEXT,
            brand TEXT,
            cost_price REAL NOT NULL,
            list_price REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS marketing_campaigns (
            campaign_id INTEGER PRIMARY KEY,
            campaign_name TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT,
            budget REAL,
            channel TEXT
        );

        CREATE TABLE IF NOT EXISTS orders (
            order_id INTEGER PRIMARY KEY,
            customer_id INTEGER NOT NULL REFERENCES customers(customer_id),
            order_date TEXT NOT NULL,
            ship_date TEXT,
            order_status TEXT NOT NULL,
            shipping_cost REAL DEFAULT 0,
            payment_method TEXT
        );

        CREATE TABLE IF NOT EXISTS order_items (
            order_item_id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id INTEGER NOT NULL REFERENCES orders(order_id),
            product_id INTEGER NOT NULL REFERENCES products(product_id),
            quantity INTEGER NOT NULL,
            unit_price REAL NOT NULL,
            discount_amount REAL NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS customer_acquisition (
            acquisition_id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id INTEGER NOT NULL REFERENCES customers(customer_id),
            campaign_id INTEGER NOT NULL REFERENCES marketing_campaigns(campaign_id),
            acquisition_date TEXT NOT NULL,
            acquisition_cost REAL
        );

        CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer_id);
        CREATE INDEX IF NOT EXISTS idx_orders_date ON orders(order_date);
        CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(order_status);
        CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);
        CREATE INDEX IF NOT EXISTS idx_order_items_product ON order_items(product_id);
        CREATE INDEX IF NOT EXISTS idx_acquisition_customer ON customer_acquisition(customer_id);
        "#,
    )
    .context("Failed to create schema")?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    tracing::info!("Created schema v{}", SCHEMA_VERSION);
    Ok(())
}
