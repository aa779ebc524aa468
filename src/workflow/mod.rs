//! Workflow execution: the run state machine, its driver, and the session
//! state (stats and history) that outlives individual runs.

pub mod compare;
pub mod control;
pub mod dashboard;
pub mod history;
pub mod machine;
pub mod orchestrator;
pub mod stats;

pub use compare::{Comparison, ScoreDelta};
pub use control::RunControl;
pub use dashboard::{Dashboard, load_history, load_stats};
pub use history::History;
pub use machine::{Transition, apply};
pub use orchestrator::{NoopObserver, Orchestrator, RunObserver, RunOutcome};
pub use stats::WorkflowStats;
