//! Hunter agent: discovers high-signal sources for the planned searches.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::config::AgentConfig;
use super::pricing::PricingTable;
use super::prompt::build_hunter_prompt;
use super::provider::LlmProvider;
use super::schema::{parse_response, require};
use super::search::{SearchHit, SearchProvider};
use super::traits::{Agent, stage_log};
use crate::core::{AgentRole, LogEntry, Source, SourceOrigin};
use crate::error::{AgentError, StageError};

/// Output of the Hunter stage.
#[derive(Debug, Clone, PartialEq)]
pub struct HunterOutput {
    /// Sources in the order the model ranked them.
    pub sources: Vec<Source>,
    /// Success log for the call.
    pub log: LogEntry,
}

#[derive(Debug, Deserialize)]
struct RawSources {
    #[serde(default)]
    sources: Vec<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

/// Agent that finds pages worth scraping.
pub struct HunterAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl HunterAgent {
    /// Creates a new hunter agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.model_for(AgentRole::Hunter).to_string(),
            max_tokens: config.max_tokens_for(AgentRole::Hunter),
            system_prompt,
        }
    }

    /// Finds sources for `company` across `queries`.
    ///
    /// With a search backend every query is searched and the model ranks
    /// the results; only URLs the backend returned are kept. Without one the
    /// model suggests sources itself and each is tagged
    /// [`SourceOrigin::Model`]. Sources keep the model's order and are not
    /// deduplicated.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] tagged `HUNTER` on search or client failure,
    /// invalid JSON, an empty source list or a source without an http(s) URL.
    pub async fn run(
        &self,
        provider: &dyn LlmProvider,
        search: Option<&dyn SearchProvider>,
        pricing: &PricingTable,
        company: &str,
        queries: &[String],
    ) -> Result<HunterOutput, StageError> {
        self.hunt(provider, search, pricing, company, queries)
            .await
            .map_err(|e| StageError::new(AgentRole::Hunter, e))
    }

    async fn hunt(
        &self,
        provider: &dyn LlmProvider,
        search: Option<&dyn SearchProvider>,
        pricing: &PricingTable,
        company: &str,
        queries: &[String],
    ) -> Result<HunterOutput, AgentError> {
        let hits = match search {
            Some(search) => gather(search, company, queries).await?,
            None => Vec::new(),
        };

        let response = self
            .execute(provider, &build_hunter_prompt(company, queries, &hits))
            .await?;
        let raw: RawSources = parse_response(&response, self.max_tokens)?;

        let (sources, message) = if search.is_some() {
            let sources = select_from_hits(raw.sources, &hits);
            let message = format!(
                "Found {} high-signal sources from {} search results",
                sources.len(),
                hits.len()
            );
            (sources, message)
        } else {
            let sources = suggested_sources(raw.sources)?;
            let message = format!(
                "Found {} high-signal sources (model-suggested, no web search)",
                sources.len()
            );
            (sources, message)
        };

        let log = stage_log(self, &response, pricing, message);
        Ok(HunterOutput { sources, log })
    }
}

/// Runs every query through `search`, keeping the first hit per URL.
async fn gather(
    search: &dyn SearchProvider,
    company: &str,
    queries: &[String],
) -> Result<Vec<SearchHit>, AgentError> {
    let fallback = [company.to_string()];
    let queries = if queries.is_empty() { &fallback[..] } else { queries };

    let mut hits: Vec<SearchHit> = Vec::new();
    for query in queries {
        let found = search.search(query).await?;
        debug!(search = search.name(), query = %query, hits = found.len(), "search results");
        for hit in found {
            if is_http_url(&hit.url) && !hits.iter().any(|h| h.url == hit.url) {
                hits.push(hit);
            }
        }
    }

    if hits.is_empty() {
        return Err(AgentError::Search {
            message: format!("no results for {} queries", queries.len()),
            status: None,
        });
    }
    Ok(hits)
}

/// Keeps the model's picks that name a search result.
///
/// Picks with unknown URLs are dropped. When no pick survives, the results
/// themselves are used in search order.
fn select_from_hits(picks: Vec<RawSource>, hits: &[SearchHit]) -> Vec<Source> {
    let mut sources = Vec::with_capacity(picks.len());
    for pick in picks {
        let url = pick.url.trim();
        let Some(hit) = hits.iter().find(|h| h.url == url) else {
            warn!(url, "model picked a URL that search did not return; dropping it");
            continue;
        };
        sources.push(Source {
            url: hit.url.clone(),
            title: first_non_empty(&[pick.title.as_str(), &hit.title, &hit.url]),
            content: String::new(),
            snippet: first_non_empty(&[pick.snippet.as_str(), &hit.snippet]),
            origin: SourceOrigin::Search,
        });
    }

    if sources.is_empty() {
        warn!(results = hits.len(), "model picked no search result; using results in search order");
        sources = hits
            .iter()
            .map(|hit| Source {
                url: hit.url.clone(),
                title: first_non_empty(&[hit.title.as_str(), &hit.url]),
                content: String::new(),
                snippet: hit.snippet.clone(),
                origin: SourceOrigin::Search,
            })
            .collect();
    }
    sources
}

/// Validates sources the model suggested without search results.
fn suggested_sources(raw: Vec<RawSource>) -> Result<Vec<Source>, AgentError> {
    require(!raw.is_empty(), || "sources is empty".to_string())?;

    let mut sources = Vec::with_capacity(raw.len());
    for (idx, s) in raw.into_iter().enumerate() {
        let url = s.url.trim().to_string();
        require(is_http_url(&url), || {
            format!("source {idx} has invalid url '{url}'")
        })?;
        sources.push(Source {
            title: first_non_empty(&[s.title.as_str(), &url]),
            url,
            content: String::new(),
            snippet: s.snippet.trim().to_string(),
            origin: SourceOrigin::Model,
        });
    }
    Ok(sources)
}

fn first_non_empty(candidates: &[&str]) -> String {
    candidates
        .iter()
        .map(|c| c.trim())
        .find(|c| !c.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Returns `true` for an absolute http(s) URL; the scheme is case-insensitive.
fn is_http_url(url: &str) -> bool {
    url.split_once("://").is_some_and(|(scheme, rest)| {
        (scheme.eq_ignore_ascii_case("https") || scheme.eq_ignore_ascii_case("http"))
            && !rest.is_empty()
    })
}

#[async_trait]
impl Agent for HunterAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Hunter
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::prompt::HUNTER_SYSTEM_PROMPT;
    use crate::test_support::{FakeSearch, ScriptedProvider};
    use test_case::test_case;

    fn agent() -> HunterAgent {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        HunterAgent::new(&config, HUNTER_SYSTEM_PROMPT.to_string())
    }

    async fn hunt_without_search(reply: &str) -> Result<HunterOutput, StageError> {
        let provider = ScriptedProvider::new().reply(reply);
        agent()
            .run(
                &provider,
                None,
                &PricingTable::default(),
                "Acme",
                &["Acme pricing".to_string()],
            )
            .await
    }

    #[tokio::test]
    async fn test_hunt_keeps_order_and_duplicates() {
        let out = hunt_without_search(
            r#"{"sources":[
                {"url":"https://openai.com/api/pricing","title":"Pricing","snippet":"API prices"},
                {"url":"https://openai.com/blog","title":"","snippet":"Blog"},
                {"url":"https://openai.com/api/pricing","title":"Pricing","snippet":"again"}
            ]}"#,
        )
        .await
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(out.sources.len(), 3);
        assert_eq!(out.sources[0].title, "Pricing");
        assert_eq!(out.sources[1].title, "https://openai.com/blog");
        assert_eq!(out.sources[2].snippet, "again");
        assert!(out.sources.iter().all(|s| s.content.is_empty()));
    }

    #[tokio::test]
    async fn test_hunt_without_search_tags_model_suggestions() {
        let out = hunt_without_search(r#"{"sources":[{"url":"https://acme.com","title":"Acme"}]}"#)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(out.sources[0].origin, SourceOrigin::Model);
        assert!(out.log.message.contains("model-suggested"));
    }

    #[tokio::test]
    async fn test_hunt_requires_sources() {
        let err = hunt_without_search(r#"{"sources":[]}"#)
            .await
            .err()
            .unwrap_or_else(|| unreachable!());
        assert_eq!(err.stage, AgentRole::Hunter);
        assert!(err.source.is_parse_error());
    }

    #[tokio::test]
    async fn test_hunt_rejects_non_http_url() {
        let result = hunt_without_search(r#"{"sources":[{"url":"ftp://acme.com","title":"x"}]}"#).await;
        assert!(matches!(
            result,
            Err(StageError { source: AgentError::SchemaViolation { .. }, .. })
        ));
    }

    #[test_case("https://acme.com", true ; "lower case https")]
    #[test_case("HTTPS://ACME.COM/pricing", true ; "upper case https")]
    #[test_case("Http://acme.com", true ; "mixed case http")]
    #[test_case("ftp://acme.com", false ; "other scheme")]
    #[test_case("https://", false ; "no host")]
    #[test_case("acme.com", false ; "no scheme")]
    fn test_is_http_url(url: &str, expected: bool) {
        assert_eq!(is_http_url(url), expected);
    }

    #[tokio::test]
    async fn test_hunt_accepts_upper_case_scheme() {
        let out = hunt_without_search(r#"{"sources":[{"url":"HTTPS://ACME.COM","title":"Acme"}]}"#)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(out.sources[0].url, "HTTPS://ACME.COM");
    }

    #[tokio::test]
    async fn test_hunt_with_search_keeps_only_returned_urls() {
        let search = FakeSearch::with_urls(&["https://acme.com/pricing", "https://acme.com/changelog"]);
        let provider = ScriptedProvider::new().reply(
            r#"{"sources":[
                {"url":"https://acme.com/changelog","title":"Changelog","snippet":""},
                {"url":"https://made-up.example/acme","title":"Invented"},
                {"url":" https://acme.com/pricing ","title":""}
            ]}"#,
        );
        let queries = vec!["Acme pricing".to_string(), "Acme changelog".to_string()];
        let out = agent()
            .run(&provider, Some(&search), &PricingTable::default(), "Acme", &queries)
            .await
            .unwrap_or_else(|_| unreachable!());

        let urls: Vec<_> = out.sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, ["https://acme.com/changelog", "https://acme.com/pricing"]);
        assert!(out.sources.iter().all(|s| s.origin == SourceOrigin::Search));
        assert_eq!(out.sources[0].snippet, "Result for https://acme.com/changelog");
        assert_eq!(out.sources[1].title, "acme.com");
        assert_eq!(search.queries(), queries);
        assert!(out.log.message.contains("from 2 search results"));

        let prompt = &provider.requests()[0].messages[1].content;
        assert!(prompt.contains(r#"url="https://acme.com/pricing""#));
        assert_eq!(prompt.matches("<result ").count(), 2);
    }

    #[tokio::test]
    async fn test_hunt_with_search_falls_back_to_results() {
        let search = FakeSearch::with_urls(&["https://acme.com/pricing"]);
        let provider = ScriptedProvider::new()
            .reply(r#"{"sources":[{"url":"https://made-up.example","title":"x"}]}"#);
        let out = agent()
            .run(&provider, Some(&search), &PricingTable::default(), "Acme", &[])
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(out.sources.len(), 1);
        assert_eq!(out.sources[0].url, "https://acme.com/pricing");
        assert_eq!(search.queries(), ["Acme"]);
    }

    #[tokio::test]
    async fn test_hunt_with_empty_search_fails_before_model_call() {
        let search = FakeSearch::with_urls(&[]);
        let provider = ScriptedProvider::new().reply(r#"{"sources":[]}"#);
        let err = agent()
            .run(&provider, Some(&search), &PricingTable::default(), "Acme", &[])
            .await
            .err()
            .unwrap_or_else(|| unreachable!());
        assert!(matches!(err.source, AgentError::Search { .. }));
        assert!(provider.requests().is_empty());
    }
}
