//! Web UI tests, served in-process.

use askdb::db::{MockExecutor, Value};
use askdb::llm::{InstructionTemplate, MockLlmClient};
use askdb::pipeline::Assistant;
use askdb::safety::QueryGuard;
use askdb::translator::Translator;
use askdb::web::{router, EMPTY_MESSAGE};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

fn app(executor: MockExecutor) -> axum::Router {
    let assistant = Assistant::new(
        Translator::new(Box::new(MockLlmClient::new()), InstructionTemplate::standard()),
        QueryGuard::new(true),
        Box::new(executor),
    );
    router(Arc::new(assistant))
}

async fn post_question(app: axum::Router, body: &'static str) -> (StatusCode, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ask")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_count_question_renders_one_line() {
    let executor = MockExecutor::new().with_rows(
        "SELECT COUNT(*) FROM private_schema.sales",
        "count",
        vec![vec![Value::Int(3)]],
    );

    let (status, html) = post_question(
        app(executor),
        "question=How+many+entries+of+the+records+are+present%3F",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("The Response is"));
    assert!(html.contains("<p class=\"result-text\">(3,)</p>"));
    assert!(html.contains("value=\"How many entries of the records are present?\""));
}

#[tokio::test]
async fn test_unknown_question_shows_empty_message() {
    let (status, html) = post_question(app(MockExecutor::new()), "question=what+is+love").await;

    // The mock answers with prose, which the guard refuses.
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(EMPTY_MESSAGE));
}

#[tokio::test]
async fn test_missing_question_field_is_treated_as_empty() {
    let (status, html) = post_question(app(MockExecutor::new()), "").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(EMPTY_MESSAGE));
}
