//! Error types for Sentinel.
//!
//! Each concern has its own `thiserror` enum; [`Error`] unifies them for
//! the command layer.

use thiserror::Error;
use uuid::Uuid;

use crate::core::AgentRole;

/// Result alias used by the command layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    /// Persistence failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Agent or provider failure outside a running stage.
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    /// Workflow precondition failure.
    #[error("workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Command execution failure.
    #[error("command error: {0}")]
    Command(#[from] CommandError),
}

/// Errors raised by the model client and by response parsing.
///
/// `ApiRequest` and `Timeout` are client errors; `ResponseParse` and
/// `SchemaViolation` are parse errors. The orchestrator treats both
/// families the same way.
#[derive(Error, Debug)]
pub enum AgentError {
    /// No API key was configured.
    #[error("API key missing: set SENTINEL_API_KEY, GEMINI_API_KEY or OPENAI_API_KEY")]
    ApiKeyMissing,

    /// The configured provider name is unknown.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name from configuration.
        name: String,
    },

    /// The provider call failed.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Provider error text.
        message: String,
        /// HTTP status, when the provider reported one.
        status: Option<u16>,
    },

    /// The web search backend failed.
    #[error("search failed: {message}")]
    Search {
        /// Backend error text.
        message: String,
        /// HTTP status, when the backend reported one.
        status: Option<u16>,
    },

    /// The provider call exceeded the configured timeout.
    #[error("request timed out after {seconds}s")]
    Timeout {
        /// Configured timeout in seconds.
        seconds: u64,
    },

    /// The response was not valid JSON.
    #[error("failed to parse response: {message}")]
    ResponseParse {
        /// What went wrong.
        message: String,
        /// Raw response content.
        content: String,
    },

    /// The response was JSON but did not match the stage's contract.
    #[error("response violates schema: {message}")]
    SchemaViolation {
        /// Which rule was broken.
        message: String,
    },

    /// A stage was invoked without the inputs an earlier stage provides.
    #[error("orchestration error: {message}")]
    Orchestration {
        /// Description.
        message: String,
    },
}

impl AgentError {
    /// Returns `true` for errors caused by the response content rather than
    /// the transport.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self, Self::ResponseParse { .. } | Self::SchemaViolation { .. })
    }
}

/// An [`AgentError`] tagged with the stage that raised it.
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    /// Stage that failed.
    pub stage: AgentRole,
    /// Underlying cause.
    #[source]
    pub source: AgentError,
}

impl StageError {
    /// Tags `source` with `stage`.
    #[must_use]
    pub const fn new(stage: AgentRole, source: AgentError) -> Self {
        Self { stage, source }
    }
}

/// Dashboard-level precondition failures.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The query was empty or whitespace only.
    #[error("query cannot be empty")]
    EmptyQuery,

    /// A run is already in progress.
    #[error("workflow {workflow_id} is still running")]
    AlreadyRunning {
        /// The active run.
        workflow_id: Uuid,
    },

    /// No history entry matches the identifier.
    #[error("no history entry matches '{id}'")]
    NotFound {
        /// Identifier or prefix that was looked up.
        id: String,
    },

    /// A prefix matched more than one history entry.
    #[error("'{prefix}' matches {matches} history entries; use a longer prefix")]
    AmbiguousId {
        /// Prefix that was looked up.
        prefix: String,
        /// Number of matches.
        matches: usize,
    },
}

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// `SQLite` failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Command execution errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command could not complete.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Output could not be rendered.
    #[error("output formatting failed: {0}")]
    OutputFormat(String),

    /// The workflow ran and failed; `output` holds the partial results.
    #[error("workflow failed: {reason}")]
    WorkflowFailed {
        /// The failure message recorded in the run log.
        reason: String,
        /// Rendered partial results.
        output: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_names_stage() {
        let err = StageError::new(
            AgentRole::Scraper,
            AgentError::ApiRequest {
                message: "connection reset".to_string(),
                status: None,
            },
        );
        assert_eq!(
            err.to_string(),
            "SCRAPER stage failed: API request failed: connection reset"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_parse_error_classification() {
        assert!(
            AgentError::SchemaViolation {
                message: "x".to_string()
            }
            .is_parse_error()
        );
        assert!(!AgentError::Timeout { seconds: 5 }.is_parse_error());
    }
}
