//! PostgreSQL query executor.
//!
//! Each call opens its own connection, runs the statement inside a
//! transaction, fetches the rows of the last result set, commits and closes.
//! Nothing is pooled.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, QueryExecutor, QueryResult, Row, Value};
use crate::error::{AskError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures::TryStreamExt;
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Column as _, Connection, Either, Executor as _, Postgres, Row as _, TypeInfo as _};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// PostgreSQL executor bound to one set of connection parameters.
#[derive(Debug, Clone)]
pub struct PostgresExecutor {
    config: ConnectionConfig,
    read_only: bool,
}

impl PostgresExecutor {
    /// Creates an executor for the given connection parameters.
    ///
    /// No connection is opened until a statement is executed.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            read_only: false,
        }
    }

    /// Marks every transaction this executor opens as `READ ONLY`.
    ///
    /// The server then refuses writes the classifier cannot see, such as
    /// `SELECT ... INTO` or side-effecting function calls.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    fn connect_options(&self) -> Result<PgConnectOptions> {
        let required = |value: &Option<String>, key: &str| {
            value
                .clone()
                .ok_or_else(|| AskError::config(format!("missing database.{key}")))
        };

        Ok(PgConnectOptions::new()
            .host(&required(&self.config.host, "host")?)
            .port(self.config.port())
            .username(&required(&self.config.user, "user")?)
            .password(&required(&self.config.password, "password")?)
            .database(&required(&self.config.database, "database")?))
    }

    async fn connect(&self) -> Result<PgConnection> {
        let options = self.connect_options()?;
        debug!("Connecting to {}", self.config.display_string());

        let connecting = PgConnection::connect_with(&options);
        let connected = match self.config.connect_timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), connecting)
                .await
                .map_err(|_| {
                    AskError::connection(format!(
                        "Connection to {} timed out after {secs} seconds",
                        self.config.display_string()
                    ))
                })?,
            None => connecting.await,
        };

        connected.map_err(|e| map_connection_error(e, &self.config))
    }
}

#[async_trait]
impl QueryExecutor for PostgresExecutor {
    async fn try_execute(&self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();
        let mut conn = self.connect().await?;

        let fetched = run_in_transaction(&mut conn, sql, self.read_only).await;

        if let Err(e) = conn.close().await {
            warn!("Failed to close connection cleanly: {e}");
        }

        let pg_rows = fetched?;
        let execution_time = start.elapsed();

        let columns: Vec<ColumnInfo> = pg_rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        let rows: Vec<Row> = pg_rows.iter().map(convert_row).collect();

        debug!(
            "Statement returned {} rows in {:?}",
            rows.len(),
            execution_time
        );

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }
}

/// Runs `sql` in a transaction and commits it.
///
/// An error leaves the transaction to roll back when it is dropped.
async fn run_in_transaction(
    conn: &mut PgConnection,
    sql: &str,
    read_only: bool,
) -> Result<Vec<PgRow>> {
    let mut tx = conn.begin().await.map_err(query_error)?;

    if read_only {
        (&mut *tx)
            .execute("SET TRANSACTION READ ONLY")
            .await
            .map_err(query_error)?;
    }

    let rows = fetch_last_result(&mut tx, sql).await.map_err(query_error)?;

    tx.commit().await.map_err(query_error)?;

    Ok(rows)
}

/// Sends `sql` over the simple-query protocol and keeps the rows of the
/// final statement.
///
/// The text may hold several `;`-separated statements. Each statement's rows
/// arrive before its completion message, so a completion starts a new set.
async fn fetch_last_result(conn: &mut PgConnection, sql: &str) -> sqlx::Result<Vec<PgRow>> {
    let mut results = conn.fetch_many(sqlx::raw_sql(sql));
    let mut current = Vec::new();
    let mut last = Vec::new();

    while let Some(item) = results.try_next().await? {
        match item {
            Either::Left(_) => last = std::mem::take(&mut current),
            Either::Right(row) => current.push(row),
        }
    }

    if !current.is_empty() {
        last = current;
    }

    Ok(last)
}

fn query_error(error: sqlx::Error) -> AskError {
    AskError::query(format_query_error(error))
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Decodes a nullable column, or `None` if the value does not decode as `T`.
fn decode<'r, T>(row: &'r PgRow, index: usize) -> Option<Option<T>>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get::<Option<T>, _>(index).ok()
}

/// Converts a single column value to its native Value variant.
///
/// Types without a dedicated variant (uuid, json, intervals, ...) and values
/// that fail to decode fall back to their text form.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    let typed: Option<Option<Value>> = match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => decode::<bool>(row, index).map(|v| v.map(Value::Bool)),

        "INT2" | "SMALLINT" => {
            decode::<i16>(row, index).map(|v| v.map(|n| Value::Int(n.into())))
        }

        "INT4" | "INT" | "INTEGER" => {
            decode::<i32>(row, index).map(|v| v.map(|n| Value::Int(n.into())))
        }

        "INT8" | "BIGINT" => decode::<i64>(row, index).map(|v| v.map(Value::Int)),

        "FLOAT4" | "REAL" => {
            decode::<f32>(row, index).map(|v| v.map(|n| Value::Float(n.into())))
        }

        "FLOAT8" | "DOUBLE PRECISION" => decode::<f64>(row, index).map(|v| v.map(Value::Float)),

        "NUMERIC" | "DECIMAL" => decode::<Decimal>(row, index).map(|v| v.map(Value::Decimal)),

        "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" => {
            decode::<String>(row, index).map(|v| v.map(Value::String))
        }

        "DATE" => decode::<NaiveDate>(row, index).map(|v| v.map(Value::Date)),

        "TIME" => decode::<NaiveTime>(row, index).map(|v| v.map(Value::Time)),

        "TIMESTAMP" => decode::<NaiveDateTime>(row, index).map(|v| v.map(Value::Timestamp)),

        "TIMESTAMPTZ" => {
            decode::<DateTime<Utc>>(row, index).map(|v| v.map(Value::TimestampTz))
        }

        "BYTEA" => decode::<Vec<u8>>(row, index).map(|v| v.map(Value::Bytes)),

        _ => None,
    };

    match typed {
        Some(value) => value.unwrap_or(Value::Null),
        None => row
            .try_get_unchecked::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> AskError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port();
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        AskError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        AskError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        AskError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        AskError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        AskError::connection(error.to_string())
    }
}

/// Formats a query error with PostgreSQL detail and hint when available.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }

        if let Some(table) = pg_error.table() {
            result.push_str("\n  TABLE: ");
            result.push_str(table);
        }

        if let Some(column) = pg_error.column() {
            result.push_str("\n  COLUMN: ");
            result.push_str(column);
        }
    }

    result
}
