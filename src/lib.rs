//! # Sentinel
//!
//! Competitive intelligence reports from a five-stage LLM agent pipeline.
//!
//! A query such as *"Analyze OpenAI's pricing"* flows through five agents:
//! the Router classifies it and plans searches, the Hunter finds sources,
//! the Scraper condenses them, the Analyst produces a scored SWOT, and the
//! Reporter writes an executive markdown report. Every stage records a log
//! entry with latency, token usage and estimated cost.
//!
//! ## Layout
//!
//! - [`core`]: run state, logs, SWOT and stage identity
//! - [`agent`]: provider abstraction, configuration, prompts and the stage agents
//! - [`workflow`]: the run state machine, its driver, stats, history and the
//!   [`Dashboard`](workflow::Dashboard) facade
//! - [`storage`]: key-value persistence (`SQLite` or in-memory)
//! - [`cli`]: the `sentinel` command line
//!
//! ## Example
//!
//! ```no_run
//! use sentinel_ci::agent::{AgentConfig, create_provider};
//! use sentinel_ci::storage::SqliteStore;
//! use sentinel_ci::workflow::{Dashboard, Orchestrator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AgentConfig::from_env()?;
//! let provider = create_provider(&config)?;
//! let orchestrator = Orchestrator::new(provider, config);
//! let mut dashboard = Dashboard::load(orchestrator, Box::new(SqliteStore::open(".sentinel/sentinel.db")?));
//!
//! let state = dashboard.analyze("Analyze OpenAI's pricing").await?;
//! if let Some(report) = state.report() {
//!     println!("{report}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod error;
pub mod storage;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::core::{AgentRole, AnalysisType, LogEntry, RunState, RunStatus, Swot};
pub use error::{Error, Result};
pub use workflow::{Dashboard, Orchestrator, RunControl};
