//! Core domain types shared by the agents, the workflow and storage.

pub mod log;
pub mod role;
pub mod run_state;
pub mod swot;

pub use log::{LogEntry, LogKind};
pub use role::{AgentRole, AnalysisType};
pub use run_state::{RunState, RunStatus, Source, SourceOrigin};
pub use swot::{MAX_SCORE, StrategicScores, Swot};
