//! Read-only access to the commerce database
//!
//! Reports open the database with `SQLITE_OPEN_READ_ONLY` through an r2d2
//! pool, so any number of report runs can read the same snapshot side by
//! side without ever writing back.
//!
//! # Architecture
//!
//! ```text
//! CohortPipeline
//!     │
//!     └──→ CommerceStore (r2d2 pool, read-only)
//!             │
//!             ├──→ order_lines()      order_items ⋈ orders ⋈ customers
//!             ├──→ check_integrity()  orphan counts
//!             └──→ table_counts()     row counts per table
//! ```

use crate::model::{OrderLine, OrderStatus};
use crate::pipeline::LineSource;
use anyhow::{bail, Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::path::{Path, PathBuf};

pub mod schema;
pub mod seed;

/// Orphaned rows found by [`CommerceStore::check_integrity`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    /// Order lines whose order does not exist
    pub lines_without_order: i64,
    /// Order lines whose product does not exist
    pub lines_without_product: i64,
    /// Orders whose customer does not exist
    pub orders_without_customer: i64,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.lines_without_order == 0
            && self.lines_without_product == 0
            && self.orders_without_customer == 0
    }
}

/// Query interface for the commerce database
///
/// # Example
///
/// ```rust,ignore
/// # fn main() -> anyhow::Result<()> {
/// let store = CommerceStore::open_read_only("./data/commerce.db", 4)?;
/// let lines = store.order_lines()?;
/// println!("{} order lines", lines.len());
/// # Ok(())
/// # }
/// ```
pub struct CommerceStore {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
    label: String,
}

impl CommerceStore {
    /// Open a read-only connection pool
    ///
    /// # Errors
    /// Returns an error if the file does not exist, cannot be opened, or a
    /// test connection cannot be established.
    pub fn open_read_only(db_path: impl AsRef<Path>, pool_size: u32) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        if !path.exists() {
            bail!(
                "Database {} does not exist (run `commerce-cohorts schema` and `seed` first)",
                path.display()
            );
        }

        let manager = SqliteConnectionManager::file(&path).with_flags(
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        );
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .with_context(|| format!("Failed to open database {}", path.display()))?;

        // Verify connection works
        let conn = pool.get()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;

        let label = format!("sqlite:{}", path.display());
        Ok(Self { pool, path, label })
    }

    /// Get a connection from the pool
    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Count orphaned references.
    ///
    /// The schema declares foreign keys, but SQLite only enforces them when
    /// the writer enabled them, so data loaded by other tools can violate them.
    pub fn check_integrity(&self) -> Result<IntegrityReport> {
        let conn = self.conn()?;

        let count = |sql: &str| -> Result<i64> {
            Ok(conn.query_row(sql, [], |row| row.get(0))?)
        };

        Ok(IntegrityReport {
            lines_without_order: count(
                "SELECT COUNT(*) FROM order_items oi
                 LEFT JOIN orders o ON o.order_id = oi.order_id
                 WHERE o.order_id IS NULL",
            )?,
            lines_without_product: count(
                "SELECT COUNT(*) FROM order_items oi
                 LEFT JOIN products p ON p.product_id = oi.product_id
                 WHERE p.product_id IS NULL",
            )?,
            orders_without_customer: count(
                "SELECT COUNT(*) FROM orders o
                 LEFT JOIN customers c ON c.customer_id = o.customer_id
                 WHERE c.customer_id IS NULL",
            )?,
        })
    }

    /// Fail with a descriptive error if any orphaned reference exists
    pub fn ensure_integrity(&self) -> Result<()> {
        let report = self.check_integrity()?;
        if !report.is_clean() {
            bail!(
                "Integrity check failed for {}: {} order lines without order, \
                 {} order lines without product, {} orders without customer",
                self.path.display(),
                report.lines_without_order,
                report.lines_without_product,
                report.orders_without_customer
            );
        }
        tracing::debug!("Integrity check passed");
        Ok(())
    }

    /// Row count of every table, in `schema::TABLES` order
    pub fn table_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        let conn = self.conn()?;
        let mut counts = Vec::with_capacity(schema::TABLES.len());
        for table in schema::TABLES {
            // Table names come from a fixed list, never from input
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
            counts.push((table, n));
        }
        Ok(counts)
    }
}

impl LineSource for CommerceStore {
    fn name(&self) -> &str {
        &self.label
    }

    /// Every order line joined to its order and customer, in insertion order.
    ///
    /// Status filtering is left to the pipeline.
    fn order_lines(&self) -> Result<Vec<OrderLine>> {
        let conn = self.conn()?;

        let sql = r#"
            SELECT
                oi.order_id,
                o.customer_id,
                oi.product_id,
                o.order_date,
                o.order_status,
                oi.quantity,
                oi.unit_price,
                oi.discount_amount
            FROM order_items oi
            JOIN orders o ON o.order_id = oi.order_id
            JOIN customers c ON c.customer_id = o.customer_id
            ORDER BY oi.order_item_id
        "#;

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(4)?;
            Ok(OrderLine {
                order_id: row.get(0)?,
                customer_id: row.get(1)?,
                product_id: row.get(2)?,
                order_date: row.get(3)?,
                status: OrderStatus::parse(&status),
                quantity: row.get(5)?,
                unit_price: row.get(6)?,
                discount_amount: row.get(7)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.context("Failed to decode order line")?);
        }
        Ok(results)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::schema;
    use rusqlite::Connection;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// A database file inside its own temp dir; both are removed on drop
    pub struct TempDb {
        _dir: TempDir,
        pub path: PathBuf,
    }

    impl TempDb {
        pub fn new(name: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join(format!("{name}.db"));
            Self { _dir: dir, path }
        }

        /// Create the schema and return a writable connection
        pub fn writable(&self) -> Connection {
            let conn = schema::open_writable(&self.path).unwrap();
            schema::create_schema(&conn).unwrap();
            conn
        }
    }
}
