//! Session facade over the orchestrator, stats, history and persistence.
//!
//! The dashboard owns the process-wide state: it loads stats and history
//! from a [`KeyValueStore`] at start, keeps the current [`RunState`], and
//! writes stats and history back on every change. Persistence failures are
//! logged and otherwise ignored.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, error, warn};

use super::compare::Comparison;
use super::control::RunControl;
use super::history::History;
use super::machine::{Transition, apply};
use super::orchestrator::{Orchestrator, RunObserver};
use super::stats::WorkflowStats;
use crate::core::{AgentRole, LogEntry, RunState, RunStatus};
use crate::error::WorkflowError;
use crate::storage::{HISTORY_KEY, KeyValueStore, STATS_KEY};

/// Mutable session state, updated by the running workflow.
struct Session {
    store: Box<dyn KeyValueStore>,
    stats: WorkflowStats,
    history: History,
    state: RunState,
    updates: watch::Sender<RunState>,
}

impl Session {
    fn publish(&mut self, state: RunState) {
        self.state = state.clone();
        self.updates.send_replace(state);
    }

    fn persist_stats(&mut self) {
        persist(&mut *self.store, STATS_KEY, &self.stats);
    }

    fn persist_history(&mut self) {
        persist(&mut *self.store, HISTORY_KEY, &self.history);
    }

    /// Fails a run whose driver went away before reaching a terminal state.
    fn abandon(&mut self) {
        let stage = self.state.current_agent.unwrap_or(AgentRole::Router);
        error!(
            workflow_id = ?self.state.workflow_id,
            stage = %stage,
            "workflow dropped before finishing"
        );
        let log = LogEntry::error(stage, format!("Workflow aborted during {stage} stage"));
        let next = apply(self.state.clone(), Transition::Fail(log));
        self.publish(next);
    }
}

/// Keeps the session consistent if `Dashboard::analyze` is dropped mid-run.
///
/// While armed, dropping the guard fails the active run. The control flags
/// are always reset.
struct RunGuard<'a> {
    session: &'a mut Session,
    control: &'a RunControl,
    armed: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.session.state.status.is_active() {
            self.session.abandon();
        }
        self.control.reset();
    }
}

impl RunObserver for Session {
    fn state_changed(&mut self, state: &RunState) {
        self.publish(state.clone());
    }

    fn log_recorded(&mut self, entry: &LogEntry) {
        if entry.token_usage.is_some() || entry.cost.is_some() {
            self.stats.record_log(entry);
            self.persist_stats();
        }
    }
}

/// Writes `value` as JSON under `key`, logging failures.
fn persist<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(crate::error::StorageError::from)
        .and_then(|json| store.set(key, &json));
    if let Err(e) = result {
        warn!(key, error = %e, "failed to persist state");
    }
}

/// Reads and decodes `key`, falling back to the default when absent or corrupt.
fn load<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match store.get(key) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!(key, error = %e, "stored value is corrupt; starting empty");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "failed to read stored value; starting empty");
            T::default()
        }
    }
}

/// Loads persisted stats, or the initial zero state.
pub fn load_stats(store: &dyn KeyValueStore) -> WorkflowStats {
    load(store, STATS_KEY)
}

/// Loads persisted history, or an empty history.
pub fn load_history(store: &dyn KeyValueStore) -> History {
    load(store, HISTORY_KEY)
}

/// Entry point for running workflows and browsing their results.
pub struct Dashboard {
    orchestrator: Orchestrator,
    session: Session,
    control: RunControl,
}

impl Dashboard {
    /// Creates a dashboard, loading stats and history from `store`.
    pub fn load(orchestrator: Orchestrator, store: Box<dyn KeyValueStore>) -> Self {
        let stats = load_stats(&*store);
        let history = load_history(&*store);
        debug!(
            total_workflows = stats.total_workflows,
            history = history.len(),
            "dashboard loaded"
        );

        let (updates, _rx) = watch::channel(RunState::default());
        Self {
            orchestrator,
            session: Session {
                store,
                stats,
                history,
                state: RunState::default(),
                updates,
            },
            control: RunControl::new(),
        }
    }

    /// Runs the pipeline for `query` and returns the terminal state.
    ///
    /// A failed run is not an error here: it is returned with status
    /// `failed`. Completed runs are appended to history. If the returned
    /// future is dropped before it finishes, the run is marked `failed` and
    /// the dashboard accepts new work.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::EmptyQuery`] for a blank query (nothing is
    /// counted or changed) and [`WorkflowError::AlreadyRunning`] while a run
    /// is active.
    pub async fn analyze(&mut self, query: &str) -> Result<RunState, WorkflowError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WorkflowError::EmptyQuery);
        }
        self.ensure_idle()?;

        self.session.stats.record_workflow_start();
        self.session.persist_stats();

        let mut guard = RunGuard {
            session: &mut self.session,
            control: &self.control,
            armed: true,
        };
        let outcome = self
            .orchestrator
            .run(query, guard.control, &mut *guard.session)
            .await;
        guard.armed = false;
        drop(guard);

        if outcome.state.status == RunStatus::Completed {
            self.session.stats.record_completion(outcome.elapsed);
            self.session.history.append(outcome.state.clone());
            self.session.persist_stats();
            self.session.persist_history();
        }

        Ok(outcome.state)
    }

    /// Returns to a fresh idle state with empty logs and no query.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::AlreadyRunning`] while a run is active.
    pub fn reset(&mut self) -> Result<(), WorkflowError> {
        self.ensure_idle()?;
        self.session.publish(RunState::default());
        Ok(())
    }

    /// Makes a history entry the current state and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::AlreadyRunning`] while a run is active, or a
    /// lookup error from [`History::find`].
    pub fn view_history_entry(&mut self, ident: &str) -> Result<RunState, WorkflowError> {
        self.ensure_idle()?;
        let entry = self.session.history.find(ident)?.clone();
        self.session.publish(entry.clone());
        Ok(entry)
    }

    /// Compares two history entries.
    ///
    /// # Errors
    ///
    /// Returns a lookup error from [`History::find`] for either identifier.
    pub fn compare(&self, left: &str, right: &str) -> Result<Comparison, WorkflowError> {
        let left = self.session.history.find(left)?.clone();
        let right = self.session.history.find(right)?.clone();
        Ok(Comparison::new(left, right))
    }

    /// Erases stats, history and the current state, in memory and in the store.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::AlreadyRunning`] while a run is active.
    pub fn clear(&mut self) -> Result<(), WorkflowError> {
        self.ensure_idle()?;
        self.session.stats = WorkflowStats::default();
        self.session.history = History::default();
        self.session.persist_stats();
        self.session.persist_history();
        self.session.publish(RunState::default());
        Ok(())
    }

    /// Current run state.
    #[must_use]
    pub const fn state(&self) -> &RunState {
        &self.session.state
    }

    /// Cumulative statistics.
    #[must_use]
    pub const fn stats(&self) -> &WorkflowStats {
        &self.session.stats
    }

    /// Completed runs, newest first.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.session.history
    }

    /// Receiver of state snapshots, updated after every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.session.updates.subscribe()
    }

    /// Handle for pausing, resuming or cancelling the current run.
    #[must_use]
    pub fn control(&self) -> RunControl {
        self.control.clone()
    }

    fn ensure_idle(&self) -> Result<(), WorkflowError> {
        let state = &self.session.state;
        if state.status.is_active() {
            return Err(WorkflowError::AlreadyRunning {
                workflow_id: state.workflow_id.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentConfig, ChatRequest, ChatResponse, LlmProvider, PromptSet};
    use crate::error::{AgentError, StorageError};
    use crate::storage::MemoryStore;
    use crate::test_support::{ScriptedProvider, happy_path};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    fn dashboard(provider: impl LlmProvider + 'static, store: Box<dyn KeyValueStore>) -> Dashboard {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let orch = Orchestrator::with_prompts(Arc::new(provider), config, PromptSet::defaults());
        Dashboard::load(orch, store)
    }

    /// Provider whose calls never return.
    struct StalledProvider;

    #[async_trait]
    impl LlmProvider for StalledProvider {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            std::future::pending().await
        }
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }
    }

    #[tokio::test]
    async fn test_empty_query_changes_nothing() {
        let mut dash = dashboard(ScriptedProvider::new(), Box::new(MemoryStore::new()));
        let result = dash.analyze("   ").await;
        assert!(matches!(result, Err(WorkflowError::EmptyQuery)));
        assert_eq!(dash.stats().total_workflows, 0);
        assert_eq!(dash.state().status, RunStatus::Idle);
    }

    #[tokio::test]
    async fn test_successful_run_updates_stats_and_history() {
        let mut dash = dashboard(happy_path("OpenAI"), Box::new(MemoryStore::new()));
        let mut rx = dash.subscribe();
        let state = dash
            .analyze("Analyze OpenAI's pricing")
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(state.status, RunStatus::Completed);
        assert_eq!(dash.stats().total_workflows, 1);
        assert_eq!(dash.stats().completed_workflows, 1);
        assert!(dash.stats().total_tokens > 0);
        assert_eq!(dash.history().len(), 1);
        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(rx.borrow_and_update().status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_failed_run_not_in_history() {
        let provider = happy_path("OpenAI").fail_at(
            AgentRole::Hunter.position(),
            AgentError::ApiRequest {
                message: "503".to_string(),
                status: Some(503),
            },
        );
        let mut dash = dashboard(provider, Box::new(MemoryStore::new()));
        let state = dash.analyze("Analyze OpenAI").await.unwrap_or_default();
        assert_eq!(state.status, RunStatus::Failed);
        assert!(dash.history().is_empty());
        assert_eq!(dash.stats().total_workflows, 1);
        assert!(dash.stats().success_rate.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_persistence_failure_does_not_fail_run() {
        let mut dash = dashboard(happy_path("OpenAI"), Box::new(FailingStore));
        let state = dash.analyze("Analyze OpenAI").await.unwrap_or_default();
        assert_eq!(state.status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_reset_after_run() {
        let mut dash = dashboard(happy_path("OpenAI"), Box::new(MemoryStore::new()));
        let _ = dash.analyze("Analyze OpenAI").await;
        assert!(dash.reset().is_ok());
        assert_eq!(dash.state().status, RunStatus::Idle);
        assert!(dash.state().logs.is_empty());
        assert!(dash.state().query.is_empty());
        assert_eq!(dash.history().len(), 1);
    }

    #[test]
    fn test_corrupt_store_loads_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(STATS_KEY, "{not json")
            .unwrap_or_else(|_| unreachable!());
        store
            .set(HISTORY_KEY, "42")
            .unwrap_or_else(|_| unreachable!());
        let dash = dashboard(ScriptedProvider::new(), Box::new(store));
        assert_eq!(dash.stats(), &WorkflowStats::default());
        assert!(dash.history().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_analyze_fails_run_and_frees_dashboard() {
        let mut dash = dashboard(StalledProvider, Box::new(MemoryStore::new()));
        let rx = dash.subscribe();
        let control = dash.control();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            control.cancel();
        });

        let result =
            tokio::time::timeout(Duration::from_millis(50), dash.analyze("Analyze OpenAI")).await;
        assert!(result.is_err());

        assert_eq!(dash.state().status, RunStatus::Failed);
        assert_eq!(dash.state().error_logs().count(), 1);
        assert_eq!(dash.state().logs[0].agent, AgentRole::Router);
        assert_eq!(rx.borrow().status, RunStatus::Failed);
        assert!(!dash.control().is_cancelled());
        assert_eq!(dash.stats().total_workflows, 1);
        assert!(dash.history().is_empty());

        assert!(dash.reset().is_ok());
        assert_eq!(dash.state().status, RunStatus::Idle);
    }
}
