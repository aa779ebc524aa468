//! Run state machine.
//!
//! ```text
//! idle ──Begin──▶ running ──Enter/Routed/…/Analyzed──▶ running
//!                   │  ▲                                  │
//!              Pause│  │Resume                   Reported │
//!                   ▼  │                                  ▼
//!                  paused                             completed
//!
//! running | paused ──Fail──▶ failed
//! ```
//!
//! [`apply`] is pure: it consumes a [`RunState`] and returns the next one.
//! The orchestrator drives it; nothing else mutates run state.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::agent::{AnalystOutput, HunterOutput, ReporterOutput, RouterOutput, ScraperOutput};
use crate::core::{AgentRole, LogEntry, RunState, RunStatus};

/// An event that moves a run forward.
#[derive(Debug, Clone)]
pub enum Transition {
    /// Start a new run, discarding the previous state.
    Begin {
        /// Identifier of the new run.
        workflow_id: Uuid,
        /// Start time.
        timestamp: DateTime<Utc>,
        /// Query being analyzed.
        query: String,
    },
    /// A stage is about to call the model.
    Enter(AgentRole),
    /// The run is held before `stage`.
    Pause {
        /// Stage that will run on resume.
        stage: AgentRole,
        /// Info entry describing the pause.
        log: LogEntry,
    },
    /// A held run continues.
    Resume {
        /// Stage that runs next.
        stage: AgentRole,
        /// Info entry describing the resume.
        log: LogEntry,
    },
    /// Router output.
    Routed(RouterOutput),
    /// Hunter output.
    Hunted(HunterOutput),
    /// Scraper output.
    Scraped(ScraperOutput),
    /// Analyst output.
    Analyzed(AnalystOutput),
    /// Reporter output; completes the run.
    Reported(ReporterOutput),
    /// The run failed; carries the single error entry.
    Fail(LogEntry),
}

impl Transition {
    /// Returns the log entry this transition appends, if any.
    #[must_use]
    pub const fn log(&self) -> Option<&LogEntry> {
        match self {
            Self::Begin { .. } | Self::Enter(_) => None,
            Self::Pause { log, .. } | Self::Resume { log, .. } | Self::Fail(log) => Some(log),
            Self::Routed(out) => Some(&out.log),
            Self::Hunted(out) => Some(&out.log),
            Self::Scraped(out) => Some(&out.log),
            Self::Analyzed(out) => Some(&out.log),
            Self::Reported(out) => Some(&out.log),
        }
    }
}

/// Applies `transition` to `state`.
///
/// Stage outputs are merged as soon as they arrive, so a later failure
/// leaves earlier results visible.
#[must_use]
pub fn apply(mut state: RunState, transition: Transition) -> RunState {
    match transition {
        Transition::Begin {
            workflow_id,
            timestamp,
            query,
        } => {
            state = RunState {
                workflow_id: Some(workflow_id),
                status: RunStatus::Running,
                query,
                timestamp: Some(timestamp),
                ..RunState::default()
            };
        }
        Transition::Enter(role) => {
            state.status = RunStatus::Running;
            state.current_agent = Some(role);
        }
        Transition::Pause { stage, log } => {
            state.status = RunStatus::Paused;
            state.current_agent = Some(stage);
            state.logs.insert(0, log);
        }
        Transition::Resume { stage, log } => {
            state.status = RunStatus::Running;
            state.current_agent = Some(stage);
            state.logs.insert(0, log);
        }
        Transition::Routed(out) => {
            state.target_company = out.target_company;
            state.analysis_type = Some(out.analysis_type);
            state.search_queries = out.search_queries;
            state.logs.insert(0, out.log);
        }
        Transition::Hunted(out) => {
            state.discovered_urls = out.sources;
            state.logs.insert(0, out.log);
        }
        Transition::Scraped(out) => {
            state.discovered_urls = out.sources;
            state.extracted_content = out.extracted_content;
            state.logs.insert(0, out.log);
        }
        Transition::Analyzed(out) => {
            state.swot_analysis = Some(out.swot);
            state.logs.insert(0, out.log);
        }
        Transition::Reported(out) => {
            state.final_report = Some(out.report);
            state.status = RunStatus::Completed;
            state.current_agent = None;
            state.logs.insert(0, out.log);
        }
        Transition::Fail(log) => {
            state.final_report = None;
            state.status = RunStatus::Failed;
            state.current_agent = None;
            state.logs.insert(0, log);
        }
    }

    debug_assert!(state.is_consistent());
    state
}
