//! Agent trait definition.
//!
//! All five pipeline stages implement this trait, which provides a uniform
//! interface for building the request and measuring the call.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use super::message::{ChatRequest, TokenUsage, system_message, user_message};
use super::pricing::PricingTable;
use super::provider::LlmProvider;
use crate::core::{AgentRole, LogEntry};
use crate::error::AgentError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Token usage for this call.
    pub usage: TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
    /// Wall-clock time of the model call.
    pub latency: Duration,
}

impl AgentResponse {
    /// Returns `true` when the model stopped because it hit the token limit.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }
}

/// Trait implemented by all agents in the pipeline.
///
/// Agents encapsulate one stage with a fixed system prompt and model
/// configuration. The orchestrator calls the stage-specific `run` method,
/// which goes through [`Agent::execute`] for the model call.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Pipeline stage this agent implements.
    fn role(&self) -> AgentRole;

    /// Agent name for logging and identification.
    fn name(&self) -> &'static str {
        self.role().as_str()
    }

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Whether to request JSON-formatted output.
    fn json_mode(&self) -> bool {
        true
    }

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Executes the agent with the given user message.
    ///
    /// Builds a [`ChatRequest`] from the agent's configuration, delegates to
    /// the provider, and measures the call.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures or timeouts.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        user_msg: &str,
    ) -> Result<AgentResponse, AgentError> {
        let request = ChatRequest {
            model: self.model().to_string(),
            messages: vec![system_message(self.system_prompt()), user_message(user_msg)],
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
            json_mode: self.json_mode(),
        };

        let start = Instant::now();
        let response = provider.chat(&request).await?;
        let latency = start.elapsed();

        debug!(
            agent = self.name(),
            model = %request.model,
            tokens = response.usage.total_tokens,
            latency_ms = latency.as_millis(),
            "agent call finished"
        );

        Ok(AgentResponse {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
            latency,
        })
    }
}

/// Builds the `success` log entry for a finished stage call.
///
/// Cost is looked up in `pricing` by the agent's model.
#[must_use]
pub fn stage_log(
    agent: &dyn Agent,
    response: &AgentResponse,
    pricing: &PricingTable,
    message: impl Into<String>,
) -> LogEntry {
    LogEntry::success(
        agent.role(),
        message,
        response.latency,
        response.usage.total_tokens,
        pricing.cost(agent.model(), &response.usage),
    )
}
