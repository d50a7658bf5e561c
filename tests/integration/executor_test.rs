//! Query executor integration tests.

use super::{test_executor, SEEDED_COUNT};
use askdb::db::{execute, QueryExecutor, Value};
use askdb::error::AskError;
use std::time::Duration;

#[tokio::test]
async fn test_select_one_returns_single_row() {
    let Some(executor) = test_executor() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let rows = executor.execute("SELECT 1").await;

    assert_eq!(rows, vec![vec![Value::Int(1)]]);
}

#[tokio::test]
async fn test_invalid_statement_returns_empty() {
    let Some(executor) = test_executor() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    assert!(executor.execute("SELEKT * FROM x").await.is_empty());

    let err = executor.try_execute("SELEKT * FROM x").await.unwrap_err();
    assert!(matches!(err, AskError::Query(_)));
    assert!(err.to_string().contains("syntax error"));
}

#[tokio::test]
async fn test_read_is_idempotent() {
    let Some(executor) = test_executor() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let sql = "SELECT COUNT(*) FROM (VALUES (1), (2), (3)) AS sales (sale_id)";
    let first = executor.execute(sql).await;
    let second = executor.execute(sql).await;

    assert_eq!(first, vec![vec![Value::Int(3)]]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_seeded_table_count() {
    let Some(executor) = test_executor() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = executor.try_execute(SEEDED_COUNT).await.unwrap();

    assert_eq!(result.rows, vec![vec![Value::Int(3)]]);
    assert_eq!(result.columns[0].name, "count");
}

#[tokio::test]
async fn test_multi_statement_keeps_last_result_set() {
    let Some(executor) = test_executor() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = executor
        .try_execute("SELECT 1 AS first; SELECT 2 AS a, 3 AS b")
        .await
        .unwrap();

    assert_eq!(result.rows, vec![vec![Value::Int(2), Value::Int(3)]]);
    assert_eq!(result.columns[0].name, "a");
}

#[tokio::test]
async fn test_read_only_executor_refuses_writes() {
    let Some(executor) = test_executor() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let executor = executor.with_read_only(true);

    let err = executor
        .try_execute("SELECT 1 AS n INTO TEMP TABLE askdb_copy")
        .await
        .unwrap_err();

    assert!(matches!(err, AskError::Query(_)));
    assert!(err.to_string().contains("read-only transaction"));

    let rows = executor.execute("SELECT 1").await;
    assert_eq!(rows, vec![vec![Value::Int(1)]]);
}

#[tokio::test]
async fn test_native_types() {
    let Some(executor) = test_executor() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = executor
        .try_execute("SELECT 'Widget'::text, 19.99::numeric, NULL::text, true, DATE '2024-05-01'")
        .await
        .unwrap();

    let row = &result.rows[0];
    assert_eq!(row[0], Value::String("Widget".to_string()));
    assert_eq!(row[1].to_display_string(), "19.99");
    assert_eq!(row[2], Value::Null);
    assert_eq!(row[3], Value::Bool(true));
    assert_eq!(row[4].to_display_string(), "2024-05-01");
}

#[tokio::test]
async fn test_failed_statement_rolls_back() {
    let Some(executor) = test_executor() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let rows = executor
        .execute("CREATE TEMP TABLE t (id int); INSERT INTO t VALUES (1); SELECT * FROM missing_relation")
        .await;

    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_free_function_unreachable_host_is_empty() {
    let rows = tokio::time::timeout(
        Duration::from_secs(30),
        execute("SELECT 1", "nonexistent.invalid.host", 5432, "u", "p", "d"),
    )
    .await
    .expect("executor should give up on an unresolvable host");

    assert!(rows.is_empty());
}
