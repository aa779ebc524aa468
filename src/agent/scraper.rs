//! Scraper agent: condenses each source into a fact-dense extract.

use std::fmt::Write;

use async_trait::async_trait;
use serde::Deserialize;

use super::config::AgentConfig;
use super::pricing::PricingTable;
use super::prompt::build_scraper_prompt;
use super::provider::LlmProvider;
use super::schema::{parse_response, require};
use super::traits::{Agent, stage_log};
use crate::core::{AgentRole, LogEntry, Source};
use crate::error::{AgentError, StageError};

/// Output of the Scraper stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ScraperOutput {
    /// The input sources with `content` filled from the matching extract.
    pub sources: Vec<Source>,
    /// All extracts concatenated in source order.
    pub extracted_content: String,
    /// Success log for the call.
    pub log: LogEntry,
}

#[derive(Debug, Deserialize)]
struct RawExtracts {
    #[serde(default)]
    extracts: Vec<RawExtract>,
}

#[derive(Debug, Deserialize)]
struct RawExtract {
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Agent that extracts the facts from discovered sources.
pub struct ScraperAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl ScraperAgent {
    /// Creates a new scraper agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.model_for(AgentRole::Scraper).to_string(),
            max_tokens: config.max_tokens_for(AgentRole::Scraper),
            system_prompt,
        }
    }

    /// Extracts content for every source.
    ///
    /// Extracts are matched to sources by exact URL, then by normalized URL
    /// (case and trailing slash ignored), then by position. Each extract
    /// fills at most one source unless several sources share its URL.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] tagged `SCRAPER` on client failure, invalid
    /// JSON, or when every extract is empty.
    pub async fn run(
        &self,
        provider: &dyn LlmProvider,
        pricing: &PricingTable,
        sources: &[Source],
    ) -> Result<ScraperOutput, StageError> {
        self.scrape(provider, pricing, sources)
            .await
            .map_err(|e| StageError::new(AgentRole::Scraper, e))
    }

    async fn scrape(
        &self,
        provider: &dyn LlmProvider,
        pricing: &PricingTable,
        sources: &[Source],
    ) -> Result<ScraperOutput, AgentError> {
        let response = self
            .execute(provider, &build_scraper_prompt(sources))
            .await?;
        let raw: RawExtracts = parse_response(&response, self.max_tokens)?;

        let mut enriched = sources.to_vec();
        let matched = match_extracts(sources, &raw.extracts);
        for (source, extract) in enriched.iter_mut().zip(matched) {
            if let Some(extract) = extract {
                source.content = extract.content.trim().to_string();
            }
        }

        require(enriched.iter().any(|s| !s.content.is_empty()), || {
            "no source produced any content".to_string()
        })?;

        let extracted_content = aggregate(&enriched);
        let scraped = enriched.iter().filter(|s| !s.content.is_empty()).count();

        let log = stage_log(
            self,
            &response,
            pricing,
            format!("Extracted content from {scraped} sources"),
        );

        Ok(ScraperOutput {
            sources: enriched,
            extracted_content,
            log,
        })
    }
}

/// Concatenates the non-empty extracts in source order.
fn aggregate(sources: &[Source]) -> String {
    let mut out = String::new();
    for source in sources.iter().filter(|s| !s.content.is_empty()) {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "### {}\nSource: {}\n{}",
            source.title, source.url, source.content
        );
    }
    out
}

/// Pairs every source with at most one extract.
fn match_extracts<'a>(
    sources: &[Source],
    extracts: &'a [RawExtract],
) -> Vec<Option<&'a RawExtract>> {
    let mut used = vec![false; extracts.len()];
    let mut matched: Vec<Option<&RawExtract>> = vec![None; sources.len()];

    let passes: [fn(&str, &str) -> bool; 2] = [
        |extract, source| extract == source,
        |extract, source| normalize(extract) == normalize(source),
    ];
    for same in passes {
        for (slot, source) in matched.iter_mut().zip(sources) {
            if slot.is_some() {
                continue;
            }
            let found = extracts
                .iter()
                .enumerate()
                .find(|(i, e)| !used[*i] && same(e.url.trim(), &source.url));
            if let Some((i, extract)) = found {
                used[i] = true;
                *slot = Some(extract);
            }
        }
    }

    for (idx, slot) in matched.iter_mut().enumerate() {
        if slot.is_none()
            && let Some(extract) = extracts.get(idx)
            && !used[idx]
        {
            used[idx] = true;
            *slot = Some(extract);
        }
    }

    // Duplicate sources may share one extract.
    for (slot, source) in matched.iter_mut().zip(sources) {
        if slot.is_none() {
            *slot = extracts.iter().find(|e| e.url.trim() == source.url);
        }
    }
    matched
}

fn normalize(url: &str) -> String {
    url.trim().trim_end_matches('/').to_ascii_lowercase()
}

#[async_trait]
impl Agent for ScraperAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Scraper
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
