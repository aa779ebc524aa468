//! Run log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::role::AgentRole;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Informational event (pause, resume, …).
    Info,
    /// A stage completed.
    Success,
    /// The run failed.
    Error,
    /// Something degraded but the run continued.
    Warning,
}

impl LogKind {
    /// Returns the lower-case kind name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// An immutable record of something that happened during a run.
///
/// Entries are created once by the stage (or the orchestrator, for failures
/// and control events) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// When the entry was created.
    pub timestamp: DateTime<Utc>,
    /// Stage the entry is attributed to.
    pub agent: AgentRole,
    /// Human-readable description.
    pub message: String,
    /// Severity.
    #[serde(rename = "type")]
    pub kind: LogKind,
    /// Wall-clock duration of the stage's model call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Total tokens consumed by the stage's model call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<u32>,
    /// Estimated cost of the stage's model call in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl LogEntry {
    fn new(agent: AgentRole, kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            agent,
            message: message.into(),
            kind,
            latency_ms: None,
            token_usage: None,
            cost: None,
        }
    }

    /// Creates an `info` entry.
    #[must_use]
    pub fn info(agent: AgentRole, message: impl Into<String>) -> Self {
        Self::new(agent, LogKind::Info, message)
    }

    /// Creates a `success` entry for a completed stage call.
    #[must_use]
    pub fn success(
        agent: AgentRole,
        message: impl Into<String>,
        latency: Duration,
        tokens: u32,
        cost: f64,
    ) -> Self {
        let mut entry = Self::new(agent, LogKind::Success, message);
        entry.latency_ms = Some(u64::try_from(latency.as_millis()).unwrap_or(u64::MAX));
        entry.token_usage = Some(tokens);
        entry.cost = Some(cost);
        entry
    }

    /// Creates an `error` entry.
    #[must_use]
    pub fn error(agent: AgentRole, message: impl Into<String>) -> Self {
        Self::new(agent, LogKind::Error, message)
    }

    /// Creates a `warning` entry.
    #[must_use]
    pub fn warning(agent: AgentRole, message: impl Into<String>) -> Self {
        Self::new(agent, LogKind::Warning, message)
    }

    /// Returns `true` for `error` entries.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == LogKind::Error
    }
}
