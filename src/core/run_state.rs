//! Per-run state record.
//!
//! A [`RunState`] tracks one workflow from start to its terminal status.
//! While a run is in flight it is owned by the orchestrator; once terminal
//! it is snapshotted into history and never mutated again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::log::LogEntry;
use super::role::{AgentRole, AnalysisType};
use super::swot::Swot;

/// Lifecycle status of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// No run has started (or the dashboard was reset).
    #[default]
    Idle,
    /// A stage is executing or about to execute.
    Running,
    /// Held before the next stage until resumed.
    Paused,
    /// The Reporter produced a final report.
    Completed,
    /// A stage failed or the run was cancelled.
    Failed,
}

impl RunStatus {
    /// Returns the lower-case status name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` for `completed` and `failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns `true` while a run holds the pipeline (`running` or `paused`).
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the Hunter got a source from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceOrigin {
    /// Returned by the web search backend and selected by the model.
    Search,
    /// Suggested by the model without search grounding.
    #[default]
    Model,
}

impl SourceOrigin {
    /// Returns the lower-case origin name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Model => "model",
        }
    }
}

impl std::fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source discovered by the Hunter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Page URL.
    pub url: String,
    /// Page title.
    #[serde(default)]
    pub title: String,
    /// Extracted content, filled in by the Scraper.
    #[serde(default)]
    pub content: String,
    /// Short description returned with the discovery.
    #[serde(default)]
    pub snippet: String,
    /// Search result or model suggestion.
    #[serde(default)]
    pub origin: SourceOrigin,
}

/// The mutable record tracking one workflow's progress and results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    /// Run identifier, absent while idle.
    #[serde(default)]
    pub workflow_id: Option<Uuid>,
    /// Lifecycle status.
    pub status: RunStatus,
    /// Stage currently executing (or held before, when paused).
    #[serde(default)]
    pub current_agent: Option<AgentRole>,
    /// The query that started the run.
    #[serde(default)]
    pub query: String,
    /// Company extracted by the Router.
    #[serde(default)]
    pub target_company: String,
    /// Category assigned by the Router.
    #[serde(default)]
    pub analysis_type: Option<AnalysisType>,
    /// Search queries produced by the Router.
    #[serde(default)]
    pub search_queries: Vec<String>,
    /// Sources produced by the Hunter, in discovery order.
    #[serde(default)]
    pub discovered_urls: Vec<Source>,
    /// Aggregated text produced by the Scraper.
    #[serde(default)]
    pub extracted_content: String,
    /// Analysis produced by the Analyst.
    #[serde(default)]
    pub swot_analysis: Option<Swot>,
    /// Report produced by the Reporter.
    #[serde(default)]
    pub final_report: Option<String>,
    /// Log entries, most recent first.
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    /// When the run started.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RunState {
    /// Returns the final report when one is present and non-empty.
    #[must_use]
    pub fn report(&self) -> Option<&str> {
        self.final_report.as_deref().filter(|r| !r.is_empty())
    }

    /// Returns the error entries of this run, most recent first.
    pub fn error_logs(&self) -> impl Iterator<Item = &LogEntry> {
        self.logs.iter().filter(|l| l.is_error())
    }

    /// Short form of the workflow id (first 8 characters).
    #[must_use]
    pub fn short_id(&self) -> String {
        self.workflow_id
            .map(|id| id.simple().to_string()[..8].to_string())
            .unwrap_or_default()
    }

    /// Checks the report/status invariants.
    ///
    /// A non-empty report implies `completed`; `failed` implies no report.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let has_report = self.report().is_some();
        match self.status {
            RunStatus::Completed => has_report,
            RunStatus::Failed => self.final_report.is_none(),
            _ => !has_report,
        }
    }
}
