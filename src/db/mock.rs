//! Mock executor for testing.
//!
//! Provides an in-memory stand-in that returns canned results per statement.

use super::{ColumnInfo, QueryExecutor, QueryResult, Row, Value};
use crate::error::{AskError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A mock executor that returns predefined results.
///
/// `SELECT 1` always yields one row holding `1`; other statements must be
/// registered with [`MockExecutor::with_result`] or they fail like a missing
/// relation would.
#[derive(Debug, Clone, Default)]
pub struct MockExecutor {
    results: HashMap<String, QueryResult>,
    failure: Option<String>,
    executed: Arc<Mutex<Vec<String>>>,
}

impl MockExecutor {
    /// Creates a new mock executor with no canned results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor whose every statement fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Registers the result returned for `sql`.
    pub fn with_result(mut self, sql: &str, result: QueryResult) -> Self {
        self.results.insert(normalize(sql), result);
        self
    }

    /// Registers a single-column result for `sql`.
    pub fn with_rows(self, sql: &str, column: &str, rows: Vec<Row>) -> Self {
        let columns = vec![ColumnInfo::new(column, "TEXT")];
        self.with_result(sql, QueryResult::with_data(columns, rows))
    }

    /// Returns every statement executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|statements| statements.clone())
            .unwrap_or_default()
    }
}

/// Collapses whitespace and a trailing semicolon so lookups ignore layout.
fn normalize(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(';')
        .trim_end()
        .to_string()
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn try_execute(&self, sql: &str) -> Result<QueryResult> {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(sql.to_string());
        }

        if let Some(message) = &self.failure {
            return Err(AskError::query(message.clone()));
        }

        let key = normalize(sql);
        if let Some(result) = self.results.get(&key) {
            return Ok(result.clone().with_execution_time(Duration::from_millis(1)));
        }

        if key.eq_ignore_ascii_case("SELECT 1") {
            let columns = vec![ColumnInfo::new("?column?", "INT4")];
            return Ok(QueryResult::with_data(columns, vec![vec![Value::Int(1)]]));
        }

        Err(AskError::query(format!(
            "ERROR: no canned result for statement: {key}"
        )))
    }
}
