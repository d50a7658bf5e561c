//! One question, end to end.
//!
//! [`Assistant::ask`] translates the question, passes the generated text
//! through the guard and runs it. Translation failures end the request with
//! an error. Anything that goes wrong after that is kept on the [`Answer`] as
//! [`ExecutionOutcome::Failed`] so callers can tell it apart from a query
//! that matched nothing.

use crate::config::Config;
use crate::db::{format_row, PostgresExecutor, QueryExecutor, QueryResult, Row};
use crate::error::{AskError, Result};
use crate::llm::{create_client, InstructionTemplate};
use crate::safety::QueryGuard;
use crate::translator::Translator;
use tracing::{error, info};

/// What happened when the generated statement was run.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// The statement ran; the result may have no rows.
    Rows(QueryResult),
    /// The guard refused the statement or the database reported an error.
    Failed(AskError),
}

/// The result of asking one question.
#[derive(Debug)]
pub struct Answer {
    /// The question as asked.
    pub question: String,
    /// Statement text exactly as the model produced it.
    pub query: String,
    /// Rows, or the reason there are none.
    pub outcome: ExecutionOutcome,
}

impl Answer {
    /// Returns the fetched rows; empty when the statement failed.
    pub fn rows(&self) -> &[Row] {
        match &self.outcome {
            ExecutionOutcome::Rows(result) => &result.rows,
            ExecutionOutcome::Failed(_) => &[],
        }
    }

    /// Returns the failure, if any.
    pub fn error(&self) -> Option<&AskError> {
        match &self.outcome {
            ExecutionOutcome::Rows(_) => None,
            ExecutionOutcome::Failed(e) => Some(e),
        }
    }

    /// Returns true if there is nothing to show, for whatever reason.
    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    /// Renders each row as a tuple literal, one string per row.
    pub fn lines(&self) -> Vec<String> {
        self.rows().iter().map(|row| format_row(row)).collect()
    }
}

/// Translator, guard and executor wired together.
pub struct Assistant {
    translator: Translator,
    guard: QueryGuard,
    executor: Box<dyn QueryExecutor>,
}

impl Assistant {
    /// Wires the three stages together.
    pub fn new(translator: Translator, guard: QueryGuard, executor: Box<dyn QueryExecutor>) -> Self {
        Self {
            translator,
            guard,
            executor,
        }
    }

    /// Builds the configured client, guard and PostgreSQL executor.
    ///
    /// Nothing connects yet; the database is first contacted by `ask`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = create_client(&config.llm)?;
        let translator = Translator::new(client, InstructionTemplate::standard());
        let guard = QueryGuard::new(config.safety.read_only);
        let executor =
            PostgresExecutor::new(config.database.clone()).with_read_only(config.safety.read_only);

        Ok(Self::new(translator, guard, Box::new(executor)))
    }

    /// Returns the guard applied before execution.
    pub fn guard(&self) -> &QueryGuard {
        &self.guard
    }

    /// Translates `question` and checks the result, without executing it.
    pub async fn prepare(&self, question: &str) -> Result<(String, Result<()>)> {
        let query = self.translator.translate(question).await?;
        info!("Generated query: {query}");
        let verdict = self.guard.check(&query).map(|_| ());
        Ok((query, verdict))
    }

    /// Answers `question`.
    ///
    /// Returns `Err` only when translation fails.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let (query, verdict) = self.prepare(question).await?;

        let outcome = match verdict {
            Err(e) => {
                error!("{}: {}", e.category(), e);
                ExecutionOutcome::Failed(e)
            }
            Ok(()) => match self.executor.try_execute(&query).await {
                Ok(result) => {
                    info!("Query returned {} rows", result.row_count);
                    ExecutionOutcome::Rows(result)
                }
                Err(e) => {
                    error!("{}: {}", e.category(), e);
                    ExecutionOutcome::Failed(e)
                }
            },
        };

        Ok(Answer {
            question: question.to_string(),
            query,
            outcome,
        })
    }
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("translator", &self.translator)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}
