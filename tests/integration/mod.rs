//! Integration tests for askdb.

pub mod executor_test;
pub mod pipeline_test;
pub mod web_test;

use askdb::config::ConnectionConfig;
use askdb::db::PostgresExecutor;

/// Builds an executor from DATABASE_URL, or `None` when it is unset.
pub fn test_executor() -> Option<PostgresExecutor> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    Some(PostgresExecutor::new(config))
}

/// Creates a temporary `sales` table with three rows and counts them.
///
/// Temporary tables live only as long as the connection, so seeding and
/// reading happen in the same statement text.
pub const SEEDED_COUNT: &str = "\
CREATE TEMP TABLE sales (sale_id integer PRIMARY KEY, product_name text, sale_amount numeric(10, 2));
INSERT INTO sales VALUES (1, 'Widget', 19.99), (2, 'Gadget', 5.00), (3, 'Widget', 19.99);
SELECT COUNT(*) FROM sales;";

/// Replaces `private_schema.sales` with a three-row table.
///
/// Runs against whatever DATABASE_URL points at, so that database must be
/// disposable.
pub const SEED_PRIVATE_SALES: &str = "\
CREATE SCHEMA IF NOT EXISTS private_schema;
DROP TABLE IF EXISTS private_schema.sales;
CREATE TABLE private_schema.sales (sale_id integer PRIMARY KEY, product_name text, sale_amount numeric(10, 2));
INSERT INTO private_schema.sales VALUES (1, 'Widget', 19.99), (2, 'Gadget', 5.00), (3, 'Widget', 19.99);";

pub const DROP_PRIVATE_SALES: &str = "DROP TABLE IF EXISTS private_schema.sales";
