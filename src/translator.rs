//! Question-to-query translation.
//!
//! The translator sends the instruction template and the user's question to
//! the model and hands back whatever text comes out. It does not look at the
//! question, and it does not clean up the answer: fences, prose or the
//! literal word the instructions forbid all pass through untouched.

use crate::error::Result;
use crate::llm::{build_messages, InstructionTemplate, LlmClient};
use tracing::debug;

/// Turns natural-language questions into candidate statements.
pub struct Translator {
    client: Box<dyn LlmClient>,
    template: InstructionTemplate,
}

impl Translator {
    /// Creates a translator over `client` using `template` as system instructions.
    pub fn new(client: Box<dyn LlmClient>, template: InstructionTemplate) -> Self {
        Self { client, template }
    }

    /// Translates `question` into statement text, verbatim from the model.
    ///
    /// Backend failures propagate; there is no retry.
    pub async fn translate(&self, question: &str) -> Result<String> {
        translate(self.client.as_ref(), question, self.template.as_str()).await
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("template_len", &self.template.as_str().len())
            .finish_non_exhaustive()
    }
}

/// Asks `client` for one completion of `question` under `instructions`.
pub async fn translate(client: &dyn LlmClient, question: &str, instructions: &str) -> Result<String> {
    let messages = build_messages(instructions, question);
    debug!("Requesting translation ({} chars)", question.len());
    client.complete(&messages).await
}
