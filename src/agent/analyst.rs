//! Analyst agent: turns the extracted intelligence into a scored SWOT.

use async_trait::async_trait;

use super::config::AgentConfig;
use super::pricing::PricingTable;
use super::prompt::build_analyst_prompt;
use super::provider::LlmProvider;
use super::schema::{clean_list, parse_response, require};
use super::traits::{Agent, stage_log};
use crate::core::{AgentRole, LogEntry, MAX_SCORE, Swot};
use crate::error::{AgentError, StageError};

/// Output of the Analyst stage.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalystOutput {
    /// The validated analysis.
    pub swot: Swot,
    /// Success log for the call.
    pub log: LogEntry,
}

/// Agent that produces the SWOT analysis and strategic scores.
///
/// Runs on the higher-capability model by default.
pub struct AnalystAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl AnalystAgent {
    /// Creates a new analyst agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.model_for(AgentRole::Analyst).to_string(),
            max_tokens: config.max_tokens_for(AgentRole::Analyst),
            system_prompt,
        }
    }

    /// Analyzes the aggregated content.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] tagged `ANALYST` on client failure, invalid
    /// JSON, an empty quadrant or a score above 100.
    pub async fn run(
        &self,
        provider: &dyn LlmProvider,
        pricing: &PricingTable,
        content: &str,
    ) -> Result<AnalystOutput, StageError> {
        self.analyze(provider, pricing, content)
            .await
            .map_err(|e| StageError::new(AgentRole::Analyst, e))
    }

    async fn analyze(
        &self,
        provider: &dyn LlmProvider,
        pricing: &PricingTable,
        content: &str,
    ) -> Result<AnalystOutput, AgentError> {
        let response = self.execute(provider, &build_analyst_prompt(content)).await?;
        let raw: Swot = parse_response(&response, self.max_tokens)?;

        let swot = Swot {
            strengths: clean_list(raw.strengths),
            weaknesses: clean_list(raw.weaknesses),
            opportunities: clean_list(raw.opportunities),
            threats: clean_list(raw.threats),
            scores: raw.scores,
        };

        for (name, items) in swot.quadrants() {
            require(!items.is_empty(), || format!("{name} is empty"))?;
        }
        if let Some((dimension, score)) = swot.scores.out_of_range() {
            return Err(AgentError::SchemaViolation {
                message: format!("score {dimension}={score} exceeds {MAX_SCORE}"),
            });
        }

        let log = stage_log(
            self,
            &response,
            pricing,
            "Generated SWOT analysis and strategic scores",
        );

        Ok(AnalystOutput { swot, log })
    }
}

#[async_trait]
impl Agent for AnalystAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Analyst
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
