//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use crate::config::LlmConfig;
use crate::error::{AskError, Result};
use crate::llm::{LlmClient, LlmProvider, MockLlmClient, OpenAiClient, OpenAiConfig};

/// Creates the LLM client described by `config`.
///
/// The endpoint comes from `config.base_url` when set, otherwise from the
/// provider. The API key must already have been resolved into the config.
pub fn create_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    match config.provider {
        LlmProvider::Groq | LlmProvider::OpenAi => {
            let key = config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    AskError::llm(format!(
                        "No API key configured. Set {}.",
                        config.provider.api_key_var().unwrap_or("the API key")
                    ))
                })?;

            let endpoint = config
                .base_url
                .as_deref()
                .or_else(|| config.provider.default_endpoint())
                .ok_or_else(|| AskError::internal("provider has no endpoint"))?;

            let client_config = OpenAiConfig::new(endpoint, key, config.model())
                .with_temperature(config.temperature)
                .with_timeout(config.timeout_secs);

            Ok(Box::new(OpenAiClient::new(client_config)?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}
