//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use sentinel_ci::agent::prompt::{
    ANALYST_SYSTEM_PROMPT, HUNTER_SYSTEM_PROMPT, REPORTER_SYSTEM_PROMPT, ROUTER_SYSTEM_PROMPT,
    SCRAPER_SYSTEM_PROMPT,
};
use sentinel_ci::agent::{
    AgentConfig, ChatRequest, ChatResponse, LlmProvider, PromptSet, SearchHit, SearchProvider,
    TokenUsage,
};
use sentinel_ci::core::AgentRole;
use sentinel_ci::error::AgentError;
use sentinel_ci::storage::KeyValueStore;
use sentinel_ci::workflow::{Dashboard, Orchestrator};

/// What a stage answers.
#[derive(Clone)]
pub enum Reply {
    Text(String),
    Timeout,
    ServerError,
}

/// Provider that answers by stage, identified from the system prompt.
#[derive(Clone, Default)]
pub struct StageProvider {
    replies: Arc<Mutex<HashMap<AgentRole, Reply>>>,
    calls: Arc<Mutex<Vec<AgentRole>>>,
}

impl StageProvider {
    /// Healthy provider that completes a run for `company`.
    pub fn healthy(company: &str) -> Self {
        let provider = Self::default();
        provider.set(
            AgentRole::Router,
            Reply::Text(format!(
                r#"{{"target_company":"{company}","analysis_type":"pricing",
                    "search_queries":["{company} API pricing","{company} plans","{company} changelog"]}}"#
            )),
        );
        provider.set(
            AgentRole::Hunter,
            Reply::Text(format!(
                r#"{{"sources":[
                    {{"url":"https://{company}.example/pricing","title":"Pricing","snippet":"Plans and prices"}},
                    {{"url":"https://{company}.example/changelog","title":"Changelog","snippet":"Recent releases"}}
                ]}}"#
            )),
        );
        provider.set(
            AgentRole::Scraper,
            Reply::Text(format!(
                r#"{{"extracts":[
                    {{"url":"https://{company}.example/pricing","content":"Team plan rose to $30 per seat."}},
                    {{"url":"https://{company}.example/changelog","content":"Batch API launched at half price."}}
                ]}}"#
            )),
        );
        provider.set(
            AgentRole::Analyst,
            Reply::Text(
                r#"{"strengths":["Developer mindshare"],"weaknesses":["Rising prices"],
                    "opportunities":["Enterprise agents"],"threats":["Open-weight models"],
                    "scores":{"innovation":91,"market_share":84,"pricing_power":72,"brand_reputation":86,"velocity":94}}"#
                    .to_string(),
            ),
        );
        provider.set(
            AgentRole::Reporter,
            Reply::Text(
                "## Executive Summary\n- Team plan price up\n\n## Market Updates\n| Date | Update |\n\n## Strategic Recommendation\n**Hold.**"
                    .to_string(),
            ),
        );
        provider
    }

    /// Overrides the reply for `role`.
    pub fn set(&self, role: AgentRole, reply: Reply) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(role, reply);
    }

    /// Current reply for `role`; unset stages answer with a server error.
    pub fn reply_for(&self, role: AgentRole) -> Reply {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&role)
            .cloned()
            .unwrap_or(Reply::ServerError)
    }

    /// Stages called so far, in order.
    pub fn calls(&self) -> Vec<AgentRole> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn role_of(request: &ChatRequest) -> Option<AgentRole> {
        let system = request.messages.first()?.content.as_str();
        [
            (ROUTER_SYSTEM_PROMPT, AgentRole::Router),
            (HUNTER_SYSTEM_PROMPT, AgentRole::Hunter),
            (SCRAPER_SYSTEM_PROMPT, AgentRole::Scraper),
            (ANALYST_SYSTEM_PROMPT, AgentRole::Analyst),
            (REPORTER_SYSTEM_PROMPT, AgentRole::Reporter),
        ]
        .into_iter()
        .find(|(prompt, _)| *prompt == system)
        .map(|(_, role)| role)
    }
}

#[async_trait]
impl LlmProvider for StageProvider {
    fn name(&self) -> &'static str {
        "stage"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let role = Self::role_of(request).ok_or_else(|| AgentError::ApiRequest {
            message: "unknown system prompt".to_string(),
            status: None,
        })?;
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(role);

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&role)
            .cloned();

        match reply {
            Some(Reply::Text(content)) => Ok(ChatResponse {
                content,
                usage: TokenUsage::new(400, 200),
                finish_reason: Some("stop".to_string()),
            }),
            Some(Reply::Timeout) => Err(AgentError::Timeout { seconds: 120 }),
            Some(Reply::ServerError) | None => Err(AgentError::ApiRequest {
                message: "500 Internal Server Error".to_string(),
                status: Some(500),
            }),
        }
    }
}

/// Test configuration using the default model table.
pub fn config() -> AgentConfig {
    AgentConfig::builder()
        .api_key("test-key")
        .build()
        .unwrap_or_else(|_| unreachable!())
}

/// Dashboard over `provider` and `store`, using compiled-in prompts.
pub fn dashboard(provider: StageProvider, store: Box<dyn KeyValueStore>) -> Dashboard {
    let orchestrator =
        Orchestrator::with_prompts(Arc::new(provider), config(), PromptSet::defaults());
    Dashboard::load(orchestrator, store)
}

/// Search backend that returns the same pages for every query.
pub struct StaticSearch {
    hits: Vec<SearchHit>,
}

impl StaticSearch {
    /// Hits for the healthy provider's pages of `company`.
    pub fn for_company(company: &str) -> Self {
        let hits = ["pricing", "changelog"]
            .iter()
            .map(|page| SearchHit {
                url: format!("https://{company}.example/{page}"),
                title: format!("{company}.example"),
                snippet: format!("{company} {page}"),
            })
            .collect();
        Self { hits }
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, AgentError> {
        Ok(self.hits.clone())
    }
}

/// Dashboard whose Hunter is grounded in `search`.
pub fn dashboard_with_search(
    provider: StageProvider,
    search: StaticSearch,
    store: Box<dyn KeyValueStore>,
) -> Dashboard {
    let orchestrator =
        Orchestrator::with_prompts(Arc::new(provider), config(), PromptSet::defaults())
            .with_search(Arc::new(search));
    Dashboard::load(orchestrator, store)
}
