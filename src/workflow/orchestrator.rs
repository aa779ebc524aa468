//! Drives the five-stage pipeline through the run state machine.
//!
//! Stages run strictly in order. Before each stage the orchestrator honours
//! the [`RunControl`] handle; after each stage it merges the output into the
//! run state and notifies the [`RunObserver`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::control::RunControl;
use super::machine::{Transition, apply};
use crate::agent::{
    AgentConfig, AnalystAgent, HunterAgent, LlmProvider, PromptSet, ReporterAgent, RouterAgent,
    ScraperAgent, SearchProvider,
};
use crate::core::{AgentRole, LogEntry, RunState};
use crate::error::{AgentError, StageError};

/// Receives every state change of a run.
///
/// Implementations must not block; they run between stages on the driver's
/// task.
pub trait RunObserver: Send {
    /// Called after every transition with the new state.
    fn state_changed(&mut self, state: &RunState);

    /// Called once per appended log entry, before the state that contains it
    /// is published.
    fn log_recorded(&mut self, _entry: &LogEntry) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn state_changed(&mut self, _state: &RunState) {}
}

/// Terminal state of a run plus its wall-clock duration.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final state (`completed` or `failed`).
    pub state: RunState,
    /// Time from start to the terminal transition.
    pub elapsed: Duration,
}

/// Orchestrates the Router → Hunter → Scraper → Analyst → Reporter pipeline.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    search: Option<Arc<dyn SearchProvider>>,
    config: AgentConfig,
    router: RouterAgent,
    hunter: HunterAgent,
    scraper: ScraperAgent,
    analyst: AnalystAgent,
    reporter: ReporterAgent,
}

impl Orchestrator {
    /// Creates a new orchestrator with the given provider and configuration.
    ///
    /// Loads prompt templates from the directory specified in
    /// [`AgentConfig::prompt_dir`], falling back to compiled-in defaults.
    pub fn new(provider: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Self::with_prompts(provider, config, prompts)
    }

    /// Creates an orchestrator with an explicit prompt set.
    pub fn with_prompts(
        provider: Arc<dyn LlmProvider>,
        config: AgentConfig,
        prompts: PromptSet,
    ) -> Self {
        Self {
            router: RouterAgent::new(&config, prompts.router),
            hunter: HunterAgent::new(&config, prompts.hunter),
            scraper: ScraperAgent::new(&config, prompts.scraper),
            analyst: AnalystAgent::new(&config, prompts.analyst),
            reporter: ReporterAgent::new(&config, prompts.reporter),
            provider,
            search: None,
            config,
        }
    }

    /// Grounds the Hunter in web search results from `search`.
    ///
    /// Without a search backend the Hunter relies on model-suggested
    /// sources.
    #[must_use]
    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    /// Runs the full pipeline for `query`.
    ///
    /// Never returns an error: a failing stage, or a cancel request, ends the
    /// run in the `failed` state with one error entry naming the stage.
    pub async fn run(
        &self,
        query: &str,
        control: &RunControl,
        observer: &mut dyn RunObserver,
    ) -> RunOutcome {
        let start = Instant::now();
        let workflow_id = Uuid::new_v4();
        info!(%workflow_id, query, "workflow started");

        let mut state = step(
            RunState::default(),
            Transition::Begin {
                workflow_id,
                timestamp: Utc::now(),
                query: query.to_string(),
            },
            observer,
        );

        for role in AgentRole::ALL {
            let (checked, cancelled) = checkpoint(state, role, control, observer).await;
            state = checked;
            if cancelled {
                info!(%workflow_id, stage = %role, "workflow cancelled");
                let log = LogEntry::error(role, format!("Workflow cancelled before {role} stage"));
                state = step(state, Transition::Fail(log), observer);
                break;
            }

            state = step(state, Transition::Enter(role), observer);
            debug!(%workflow_id, stage = %role, "stage started");

            match self.invoke(role, &state).await {
                Ok(transition) => state = step(state, transition, observer),
                Err(e) => {
                    error!(%workflow_id, stage = %e.stage, error = %e.source, "stage failed");
                    let log = LogEntry::error(e.stage, format!("Workflow failed: {}", e.source));
                    state = step(state, Transition::Fail(log), observer);
                    break;
                }
            }
        }

        let elapsed = start.elapsed();
        info!(
            %workflow_id,
            status = %state.status,
            elapsed_ms = elapsed.as_millis(),
            "workflow finished"
        );

        RunOutcome { state, elapsed }
    }

    /// Calls the agent for `role` with inputs taken from `state`.
    async fn invoke(&self, role: AgentRole, state: &RunState) -> Result<Transition, StageError> {
        let provider = &*self.provider;
        let pricing = &self.config.pricing;

        match role {
            AgentRole::Router => self
                .router
                .run(provider, pricing, &state.query)
                .await
                .map(Transition::Routed),
            AgentRole::Hunter => self
                .hunter
                .run(
                    provider,
                    self.search.as_deref(),
                    pricing,
                    &state.target_company,
                    &state.search_queries,
                )
                .await
                .map(Transition::Hunted),
            AgentRole::Scraper => self
                .scraper
                .run(provider, pricing, &state.discovered_urls)
                .await
                .map(Transition::Scraped),
            AgentRole::Analyst => self
                .analyst
                .run(provider, pricing, &state.extracted_content)
                .await
                .map(Transition::Analyzed),
            AgentRole::Reporter => {
                let swot = state.swot_analysis.as_ref().ok_or_else(|| {
                    StageError::new(
                        role,
                        AgentError::Orchestration {
                            message: "no SWOT analysis to report on".to_string(),
                        },
                    )
                })?;
                self.reporter
                    .run(
                        provider,
                        pricing,
                        swot,
                        &state.extracted_content,
                        &state.target_company,
                    )
                    .await
                    .map(Transition::Reported)
            }
        }
    }
}

/// Applies one transition and notifies the observer.
fn step(state: RunState, transition: Transition, observer: &mut dyn RunObserver) -> RunState {
    if let Some(log) = transition.log() {
        observer.log_recorded(log);
    }
    let next = apply(state, transition);
    observer.state_changed(&next);
    next
}

/// Honours pause and cancel before `role` starts.
///
/// Returns the (possibly paused and resumed) state and whether the run was
/// cancelled.
async fn checkpoint(
    mut state: RunState,
    role: AgentRole,
    control: &RunControl,
    observer: &mut dyn RunObserver,
) -> (RunState, bool) {
    if control.is_cancelled() {
        return (state, true);
    }
    if !control.is_paused() {
        return (state, false);
    }

    info!(stage = %role, "workflow paused");
    state = step(
        state,
        Transition::Pause {
            stage: role,
            log: LogEntry::info(role, format!("Workflow paused before {role} stage")),
        },
        observer,
    );

    if control.wait_while_paused().await {
        return (state, true);
    }

    info!(stage = %role, "workflow resumed");
    state = step(
        state,
        Transition::Resume {
            stage: role,
            log: LogEntry::info(role, "Workflow resumed"),
        },
        observer,
    );
    (state, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogKind, RunStatus, SourceOrigin};
    use crate::test_support::{FakeSearch, ScriptedProvider, happy_path};

    fn orchestrator(provider: ScriptedProvider) -> Orchestrator {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        Orchestrator::with_prompts(Arc::new(provider), config, PromptSet::defaults())
    }

    #[derive(Default)]
    struct Recorder {
        states: Vec<RunState>,
        logs: Vec<LogEntry>,
    }

    impl RunObserver for Recorder {
        fn state_changed(&mut self, state: &RunState) {
            self.states.push(state.clone());
        }

        fn log_recorded(&mut self, entry: &LogEntry) {
            self.logs.push(entry.clone());
        }
    }

    #[tokio::test]
    async fn test_happy_path_completes() {
        let orch = orchestrator(happy_path("OpenAI"));
        let mut recorder = Recorder::default();
        let outcome = orch
            .run("Analyze OpenAI's pricing", &RunControl::new(), &mut recorder)
            .await;

        assert_eq!(outcome.state.status, RunStatus::Completed);
        assert!(
            outcome
                .state
                .report()
                .is_some_and(|r| r.contains("# Competitive Intelligence Report: OpenAI"))
        );
        assert_eq!(outcome.state.logs.len(), 5);
        assert_eq!(recorder.logs.len(), 5);
        assert!(recorder.logs.iter().all(|l| l.kind == LogKind::Success));

        let entered: Vec<_> = recorder
            .states
            .iter()
            .filter_map(|s| s.current_agent)
            .collect();
        for role in AgentRole::ALL {
            assert!(entered.contains(&role));
        }
    }

    #[tokio::test]
    async fn test_failure_names_actual_stage() {
        let provider = happy_path("OpenAI").fail_at(
            AgentRole::Analyst.position(),
            AgentError::Timeout { seconds: 120 },
        );
        let outcome = orchestrator(provider)
            .run("Analyze OpenAI", &RunControl::new(), &mut NoopObserver)
            .await;

        assert_eq!(outcome.state.status, RunStatus::Failed);
        let errors: Vec<_> = outcome.state.error_logs().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].agent, AgentRole::Analyst);
        assert!(errors[0].message.starts_with("Workflow failed:"));
        assert!(!outcome.state.extracted_content.is_empty());
        assert!(outcome.state.swot_analysis.is_none());
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let control = RunControl::new();
        control.cancel();
        let outcome = orchestrator(happy_path("OpenAI"))
            .run("Analyze OpenAI", &control, &mut NoopObserver)
            .await;
        assert_eq!(outcome.state.status, RunStatus::Failed);
        assert_eq!(outcome.state.logs.len(), 1);
        assert_eq!(outcome.state.logs[0].agent, AgentRole::Router);
    }

    #[tokio::test]
    async fn test_paused_run_resumes() {
        let control = RunControl::new();
        control.pause();
        let remote = control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            remote.resume();
        });

        let mut recorder = Recorder::default();
        let outcome = orchestrator(happy_path("OpenAI"))
            .run("Analyze OpenAI", &control, &mut recorder)
            .await;

        assert_eq!(outcome.state.status, RunStatus::Completed);
        assert!(recorder.states.iter().any(|s| s.status == RunStatus::Paused));
        assert_eq!(
            outcome
                .state
                .logs
                .iter()
                .filter(|l| l.kind == LogKind::Info)
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_search_grounds_hunter_sources() {
        let search = Arc::new(FakeSearch::with_urls(&[
            "https://example.com/OpenAI/pricing",
            "https://example.com/OpenAI/blog",
        ]));
        let orch = orchestrator(happy_path("OpenAI")).with_search(search.clone());
        let outcome = orch
            .run("Analyze OpenAI", &RunControl::new(), &mut NoopObserver)
            .await;

        assert_eq!(outcome.state.status, RunStatus::Completed);
        assert_eq!(search.queries().len(), 3);
        assert_eq!(outcome.state.discovered_urls.len(), 2);
        assert!(
            outcome
                .state
                .discovered_urls
                .iter()
                .all(|s| s.origin == SourceOrigin::Search)
        );
    }
}
