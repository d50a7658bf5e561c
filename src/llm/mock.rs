//! Mock LLM client for testing.
//!
//! Provides deterministic responses based on input patterns.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{AskError, Result};
use crate::llm::prompt::EXEMPLARS;
use crate::llm::types::{Message, Role};
use crate::llm::LlmClient;

/// Mock LLM client that returns canned responses based on the question.
///
/// Out of the box it answers each documented exemplar question with the
/// documented query, which makes it a deterministic stand-in for a
/// zero-temperature model.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response), checked first.
    custom_responses: Vec<(String, String)>,
    /// When set, every call fails with this message.
    failure: Option<String>,
    /// Number of completions requested so far.
    calls: Arc<AtomicUsize>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client whose every call fails like an unreachable backend.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Adds a custom response mapping.
    ///
    /// When the question contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Returns how many completions have been requested.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Generates a mock response based on the question.
    fn mock_response(&self, input: &str) -> String {
        let input_lower = input.to_lowercase();

        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        let trimmed = input.trim();
        if let Some(exemplar) = EXEMPLARS
            .iter()
            .find(|e| e.question.eq_ignore_ascii_case(trimmed))
        {
            return exemplar.query.to_string();
        }

        "I don't understand that question. Could you please rephrase it?".to_string()
    }

    /// Extracts the last user message content from a message list.
    fn extract_user_input(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            return Err(AskError::llm(message.clone()));
        }

        let input = Self::extract_user_input(messages);
        Ok(self.mock_response(&input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_answers_every_exemplar() {
        let client = MockLlmClient::new();

        for exemplar in EXEMPLARS {
            let messages = vec![Message::user(exemplar.question)];
            let response = client.complete(&messages).await.unwrap();
            assert_eq!(response, exemplar.query);
        }
        assert_eq!(client.call_count(), EXEMPLARS.len());
    }

    #[tokio::test]
    async fn test_mock_is_case_insensitive() {
        let client = MockLlmClient::new();
        let messages = vec![Message::user("TELL ME THE TOP 5 SALES.")];

        let response = client.complete(&messages).await.unwrap();

        assert!(response.contains("ORDER BY sale_amount DESC"));
    }

    #[tokio::test]
    async fn test_mock_returns_unknown_response() {
        let client = MockLlmClient::new();
        let messages = vec![Message::user("What is the meaning of life?")];

        let response = client.complete(&messages).await.unwrap();

        assert!(response.contains("don't understand"));
    }

    #[tokio::test]
    async fn test_mock_custom_response_takes_precedence() {
        let client = MockLlmClient::new()
            .with_response("top 5", "```sql\nSELECT * FROM private_schema.sales LIMIT 5;\n```");

        let messages = vec![Message::user("Tell me the top 5 sales.")];
        let response = client.complete(&messages).await.unwrap();

        assert!(response.starts_with("```sql"));
    }

    #[tokio::test]
    async fn test_mock_uses_last_user_message() {
        let client = MockLlmClient::new();
        let messages = vec![
            Message::system("Show all the products."),
            Message::user("How many entries of the records are present?"),
        ];

        let response = client.complete(&messages).await.unwrap();

        assert_eq!(response, "SELECT COUNT(*)\nFROM private_schema.sales;");
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let client = MockLlmClient::failing("Authentication failed.");
        let messages = vec![Message::user("Show all the products.")];

        let err = client.complete(&messages).await.unwrap_err();

        assert!(matches!(err, AskError::Llm(_)));
        assert_eq!(client.call_count(), 1);
    }
}
