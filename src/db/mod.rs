//! Database access for askdb.
//!
//! The executor runs generated statement text against PostgreSQL. It exposes
//! two views of the same call: `try_execute` keeps failures as errors, and
//! `execute` logs them and returns no rows.

mod mock;
mod postgres;
mod types;

pub use mock::MockExecutor;
pub use postgres::PostgresExecutor;
pub use types::{format_row, ColumnInfo, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;
use tracing::error;

/// Runs statement text against a database.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes `sql` as given and returns every row it produced.
    async fn try_execute(&self, sql: &str) -> Result<QueryResult>;

    /// Executes `sql`, logging any failure and returning no rows in its place.
    ///
    /// A failed statement and a statement that matched nothing look the same
    /// to the caller. Use `try_execute` when the difference matters.
    async fn execute(&self, sql: &str) -> Vec<Row> {
        match self.try_execute(sql).await {
            Ok(result) => result.rows,
            Err(e) => {
                error!("{}: {}", e.category(), e);
                Vec::new()
            }
        }
    }
}

/// Opens a connection with the given parameters, runs `sql`, and returns its rows.
///
/// Failures are logged and yield an empty vector.
pub async fn execute(
    sql: &str,
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    database: &str,
) -> Vec<Row> {
    let config = ConnectionConfig::new(host, port, user, password, database);
    PostgresExecutor::new(config).execute(sql).await
}
