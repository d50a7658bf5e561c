//! End-to-end tests: question, translation, guard, execution.

use super::{test_executor, DROP_PRIVATE_SALES, SEED_PRIVATE_SALES};
use askdb::config::Config;
use askdb::db::{MockExecutor, QueryExecutor, Value};
use askdb::error::AskError;
use askdb::llm::{InstructionTemplate, LlmProvider, MockLlmClient, EXEMPLARS};
use askdb::pipeline::{Assistant, ExecutionOutcome};
use askdb::safety::QueryGuard;
use askdb::translator::Translator;
use pretty_assertions::assert_eq;

const COUNT_QUESTION: &str = "How many entries of the records are present?";

fn translator(llm: MockLlmClient) -> Translator {
    Translator::new(Box::new(llm), InstructionTemplate::standard())
}

#[tokio::test]
async fn test_count_question_with_mock_executor() {
    let executor = MockExecutor::new().with_rows(
        "SELECT COUNT(*) FROM private_schema.sales",
        "count",
        vec![vec![Value::Int(3)]],
    );
    let assistant = Assistant::new(
        translator(MockLlmClient::new()),
        QueryGuard::new(true),
        Box::new(executor),
    );

    let answer = assistant.ask(COUNT_QUESTION).await.unwrap();

    assert_eq!(answer.query, EXEMPLARS[0].query);
    assert_eq!(answer.lines(), vec!["(3,)".to_string()]);
}

#[tokio::test]
async fn test_every_exemplar_passes_the_read_only_guard() {
    let executor = MockExecutor::new();
    let recorder = executor.clone();
    let assistant = Assistant::new(
        translator(MockLlmClient::new()),
        QueryGuard::new(true),
        Box::new(executor),
    );

    for exemplar in EXEMPLARS {
        let answer = assistant.ask(exemplar.question).await.unwrap();
        assert_eq!(answer.query, exemplar.query);
        // The mock has no canned rows, so execution fails; the guard did not.
        assert!(matches!(answer.error(), Some(AskError::Query(_))));
    }

    assert_eq!(recorder.executed().len(), EXEMPLARS.len());
}

#[tokio::test]
async fn test_fenced_output_is_refused_under_read_only() {
    let llm = MockLlmClient::new().with_response(
        "customers",
        "```sql\nSELECT * FROM private_schema.customer;\n```",
    );
    let executor = MockExecutor::new();
    let recorder = executor.clone();
    let assistant = Assistant::new(translator(llm), QueryGuard::new(true), Box::new(executor));

    let answer = assistant.ask("Show all customers").await.unwrap();

    assert!(answer.query.starts_with("```"));
    assert!(matches!(answer.outcome, ExecutionOutcome::Failed(AskError::Rejected(_))));
    assert!(recorder.executed().is_empty());
}

#[tokio::test]
async fn test_count_question_against_seeded_database() {
    let Some(setup) = test_executor() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    setup.try_execute(SEED_PRIVATE_SALES).await.unwrap();

    let assistant = Assistant::new(
        translator(MockLlmClient::new()),
        QueryGuard::new(true),
        Box::new(setup.clone().with_read_only(true)),
    );
    let answer = assistant.ask(COUNT_QUESTION).await.unwrap();

    setup.try_execute(DROP_PRIVATE_SALES).await.unwrap();

    assert_eq!(answer.query, "SELECT COUNT(*)\nFROM private_schema.sales;");
    assert!(answer.error().is_none(), "{:?}", answer.error());
    assert_eq!(answer.rows(), &[vec![Value::Int(3)]]);
    assert_eq!(answer.lines(), vec!["(3,)".to_string()]);
}

#[tokio::test]
async fn test_from_config_unreachable_database_fails_softly() {
    let mut config = Config::default();
    config.llm.provider = LlmProvider::Mock;
    config.database.host = Some("nonexistent.invalid.host".to_string());
    config.database.user = Some("u".to_string());
    config.database.password = Some("p".to_string());
    config.database.database = Some("odoo17".to_string());
    config.validate().unwrap();

    let assistant = Assistant::from_config(&config).unwrap();
    let answer = assistant.ask(COUNT_QUESTION).await.unwrap();

    assert!(answer.is_empty());
    assert!(matches!(answer.error(), Some(AskError::Connection(_))));
}
