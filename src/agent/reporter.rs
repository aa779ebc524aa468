//! Reporter agent: writes the executive markdown report.

use async_trait::async_trait;

use super::config::AgentConfig;
use super::pricing::PricingTable;
use super::prompt::{REPORT_HEADING_PREFIX, build_reporter_prompt};
use super::provider::LlmProvider;
use super::schema::{require, strip_fences};
use super::traits::{Agent, stage_log};
use crate::core::{AgentRole, LogEntry, Swot};
use crate::error::{AgentError, StageError};

/// Output of the Reporter stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ReporterOutput {
    /// Markdown report, starting with the report heading.
    pub report: String,
    /// Success log for the call.
    pub log: LogEntry,
}

/// Agent that synthesizes the final report.
pub struct ReporterAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl ReporterAgent {
    /// Creates a new reporter agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.model_for(AgentRole::Reporter).to_string(),
            max_tokens: config.max_tokens_for(AgentRole::Reporter),
            system_prompt,
        }
    }

    /// Writes the report for `company`.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] tagged `REPORTER` on client failure or an
    /// empty response.
    pub async fn run(
        &self,
        provider: &dyn LlmProvider,
        pricing: &PricingTable,
        swot: &Swot,
        content: &str,
        company: &str,
    ) -> Result<ReporterOutput, StageError> {
        self.report(provider, pricing, swot, content, company)
            .await
            .map_err(|e| StageError::new(AgentRole::Reporter, e))
    }

    async fn report(
        &self,
        provider: &dyn LlmProvider,
        pricing: &PricingTable,
        swot: &Swot,
        content: &str,
        company: &str,
    ) -> Result<ReporterOutput, AgentError> {
        let response = self
            .execute(provider, &build_reporter_prompt(swot, content, company))
            .await?;

        let body = strip_fences(&response.content);
        require(!body.is_empty(), || "report is empty".to_string())?;

        let report = with_heading(body, company);
        let log = stage_log(self, &response, pricing, "Final executive report generated");

        Ok(ReporterOutput { report, log })
    }
}

/// Ensures the report opens with the heading for `company`.
///
/// A report heading naming another company is replaced; a body without one
/// gets it prepended.
fn with_heading(body: &str, company: &str) -> String {
    let heading = format!("{REPORT_HEADING_PREFIX} {company}");
    let (first, rest) = body.split_once('\n').unwrap_or((body, ""));
    if first.trim_end() == heading {
        body.to_string()
    } else if first.starts_with(REPORT_HEADING_PREFIX) {
        format!("{heading}\n{rest}")
    } else {
        format!("{heading}\n\n{body}")
    }
}

#[async_trait]
impl Agent for ReporterAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Reporter
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn json_mode(&self) -> bool {
        false
    }

    fn temperature(&self) -> f32 {
        0.3
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
