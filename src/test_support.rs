//! Scripted model and search providers shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::agent::{ChatRequest, ChatResponse, LlmProvider, SearchHit, SearchProvider, TokenUsage};
use crate::error::AgentError;

/// Provider that replays canned responses in order and records requests.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<ChatResponse, AgentError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a successful reply.
    pub fn reply(self, content: &str) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(ChatResponse {
                content: content.to_string(),
                usage: TokenUsage::new(120, 80),
                finish_reason: Some("stop".to_string()),
            }));
        self
    }

    /// Replaces the reply at `index` with an error.
    pub fn fail_at(self, index: usize, error: AgentError) -> Self {
        if let Some(slot) = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(index)
        {
            *slot = Err(error);
        }
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(AgentError::ApiRequest {
                    message: "script exhausted".to_string(),
                    status: None,
                })
            })
    }
}

/// Search backend returning fixed hits for every query.
pub struct FakeSearch {
    hits: Vec<SearchHit>,
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    /// Returns one hit per URL, titled after its host.
    pub fn with_urls(urls: &[&str]) -> Self {
        let hits = urls
            .iter()
            .map(|url| SearchHit {
                url: (*url).to_string(),
                title: url
                    .split("://")
                    .nth(1)
                    .and_then(|rest| rest.split('/').next())
                    .unwrap_or_default()
                    .to_string(),
                snippet: format!("Result for {url}"),
            })
            .collect();
        Self {
            hits,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AgentError> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_string());
        Ok(self.hits.clone())
    }
}

/// Five replies that take a run for `company` to completion.
pub fn happy_path(company: &str) -> ScriptedProvider {
    ScriptedProvider::new()
        .reply(&format!(
            r#"{{"target_company":"{company}","analysis_type":"pricing",
                "search_queries":["{company} pricing","{company} changelog","{company} news"]}}"#
        ))
        .reply(&format!(
            r#"{{"sources":[
                {{"url":"https://example.com/{company}/pricing","title":"Pricing","snippet":"Plans"}},
                {{"url":"https://example.com/{company}/blog","title":"Blog","snippet":"Updates"}}
            ]}}"#
        ))
        .reply(&format!(
            r#"{{"extracts":[
                {{"url":"https://example.com/{company}/pricing","content":"Pro plan costs $20/month."}},
                {{"url":"https://example.com/{company}/blog","content":"Shipped a new API tier."}}
            ]}}"#
        ))
        .reply(
            r#"{"strengths":["Strong brand"],"weaknesses":["High prices"],
                "opportunities":["Enterprise demand"],"threats":["Open-weight models"],
                "scores":{"innovation":90,"market_share":85,"pricing_power":75,"brand_reputation":88,"velocity":92}}"#,
        )
        .reply(&format!(
            "# Competitive Intelligence Report: {company}\n\n## Executive Summary\n- Prices steady\n"
        ))
}
