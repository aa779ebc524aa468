//! Router agent: classifies the query and plans the searches.

use async_trait::async_trait;
use serde::Deserialize;

use super::config::AgentConfig;
use super::pricing::PricingTable;
use super::prompt::build_router_prompt;
use super::provider::LlmProvider;
use super::schema::{clean_list, parse_response, require};
use super::traits::{Agent, stage_log};
use crate::core::{AgentRole, AnalysisType, LogEntry};
use crate::error::{AgentError, StageError};

/// Maximum number of search queries kept from the Router.
pub const MAX_SEARCH_QUERIES: usize = 3;

/// Output of the Router stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterOutput {
    /// Company the query is about.
    pub target_company: String,
    /// Category of analysis requested.
    pub analysis_type: AnalysisType,
    /// Between one and [`MAX_SEARCH_QUERIES`] search queries.
    pub search_queries: Vec<String>,
    /// Success log for the call.
    pub log: LogEntry,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    #[serde(default)]
    target_company: String,
    #[serde(default)]
    analysis_type: String,
    #[serde(default)]
    search_queries: Vec<String>,
}

/// Agent that extracts the target company and analysis type.
pub struct RouterAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl RouterAgent {
    /// Creates a new router agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.model_for(AgentRole::Router).to_string(),
            max_tokens: config.max_tokens_for(AgentRole::Router),
            system_prompt,
        }
    }

    /// Classifies `query`.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] tagged `ROUTER` on client failure, invalid
    /// JSON, a blank company, an unknown analysis type or no search queries.
    pub async fn run(
        &self,
        provider: &dyn LlmProvider,
        pricing: &PricingTable,
        query: &str,
    ) -> Result<RouterOutput, StageError> {
        self.route(provider, pricing, query)
            .await
            .map_err(|e| StageError::new(AgentRole::Router, e))
    }

    async fn route(
        &self,
        provider: &dyn LlmProvider,
        pricing: &PricingTable,
        query: &str,
    ) -> Result<RouterOutput, AgentError> {
        let response = self.execute(provider, &build_router_prompt(query)).await?;
        let raw: RawRoute = parse_response(&response, self.max_tokens)?;

        let target_company = raw.target_company.trim().to_string();
        require(!target_company.is_empty(), || {
            "target_company is empty".to_string()
        })?;

        let analysis_type = parse_analysis_type(&raw.analysis_type)?;

        let mut search_queries = clean_list(raw.search_queries);
        require(!search_queries.is_empty(), || {
            "search_queries is empty".to_string()
        })?;
        search_queries.truncate(MAX_SEARCH_QUERIES);

        let log = stage_log(
            self,
            &response,
            pricing,
            format!("Identified target: {target_company} ({analysis_type})"),
        );

        Ok(RouterOutput {
            target_company,
            analysis_type,
            search_queries,
            log,
        })
    }
}

fn parse_analysis_type(raw: &str) -> Result<AnalysisType, AgentError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pricing" => Ok(AnalysisType::Pricing),
        "features" => Ok(AnalysisType::Features),
        "announcements" => Ok(AnalysisType::Announcements),
        "general" => Ok(AnalysisType::General),
        other => Err(AgentError::SchemaViolation {
            message: format!("unknown analysis_type '{other}'"),
        }),
    }
}

#[async_trait]
impl Agent for RouterAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Router
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
