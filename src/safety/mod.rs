//! Query safety classification and the read-only guard.
//!
//! Generated statements pass through [`QueryGuard`] on their way from the
//! translator to the executor. The guard parses the text, classifies it as
//! safe, mutating or destructive, and under the read-only policy refuses
//! anything that is not safe before a connection is ever opened.

mod parser;

pub use parser::{classify_sql, SqlClassifier};

use crate::error::{AskError, Result};
use std::fmt;
use tracing::warn;

/// Safety level classification for SQL statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SafetyLevel {
    /// Read-only statements (SELECT, EXPLAIN, SHOW).
    Safe,
    /// Data modification (INSERT, UPDATE, MERGE).
    Mutating,
    /// Data loss or schema changes (DELETE, DROP, TRUNCATE, ALTER, ...).
    Destructive,
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Mutating => write!(f, "Mutating"),
            Self::Destructive => write!(f, "Destructive"),
        }
    }
}

/// The type of SQL statement detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    Drop,
    Truncate,
    Alter,
    Create,
    Grant,
    Revoke,
    Explain,
    Show,
    Merge,
    /// Multiple statements detected; contains the most dangerous type.
    Multiple(Box<StatementType>),
    /// Statement type could not be determined.
    Unknown,
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Drop => write!(f, "DROP"),
            Self::Truncate => write!(f, "TRUNCATE"),
            Self::Alter => write!(f, "ALTER"),
            Self::Create => write!(f, "CREATE"),
            Self::Grant => write!(f, "GRANT"),
            Self::Revoke => write!(f, "REVOKE"),
            Self::Explain => write!(f, "EXPLAIN"),
            Self::Show => write!(f, "SHOW"),
            Self::Merge => write!(f, "MERGE"),
            Self::Multiple(inner) => write!(f, "Multiple ({})", inner),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result of classifying a SQL string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// The determined safety level.
    pub level: SafetyLevel,
    /// The type of statement(s) detected.
    pub statement_type: StatementType,
    /// Optional warning message.
    pub warning: Option<String>,
}

impl ClassificationResult {
    /// Creates a new classification result.
    pub fn new(level: SafetyLevel, statement_type: StatementType) -> Self {
        Self {
            level,
            statement_type,
            warning: None,
        }
    }

    /// Creates a classification result with a warning message.
    pub fn with_warning(
        level: SafetyLevel,
        statement_type: StatementType,
        warning: impl Into<String>,
    ) -> Self {
        Self {
            level,
            statement_type,
            warning: Some(warning.into()),
        }
    }

    /// Returns true if the statement only reads.
    pub fn is_read_only(&self) -> bool {
        self.level == SafetyLevel::Safe
    }
}

/// Validation stage between translation and execution.
#[derive(Debug)]
pub struct QueryGuard {
    classifier: SqlClassifier,
    read_only: bool,
}

impl QueryGuard {
    /// Creates a guard. With `read_only`, non-safe statements are refused.
    pub fn new(read_only: bool) -> Self {
        Self {
            classifier: SqlClassifier::new(),
            read_only,
        }
    }

    /// Returns true if the guard refuses non-read-only statements.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Classifies `sql` and decides whether it may run.
    ///
    /// Under the permissive policy every statement is let through; anything
    /// other than a read is logged at `warn`.
    pub fn check(&self, sql: &str) -> Result<ClassificationResult> {
        let classification = self.classifier.classify(sql);

        if classification.is_read_only() {
            return Ok(classification);
        }

        if self.read_only {
            let reason = classification
                .warning
                .clone()
                .unwrap_or_else(|| "only read-only statements may run".to_string());
            return Err(AskError::rejected(format!(
                "{} statement ({}): {reason}",
                classification.statement_type, classification.level
            )));
        }

        warn!(
            "Executing {} statement ({}) without read-only protection",
            classification.statement_type, classification.level
        );
        Ok(classification)
    }
}
