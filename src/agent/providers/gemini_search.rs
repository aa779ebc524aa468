//! Web search through Gemini's Google Search grounding tool.
//!
//! Each query is sent to `models/{model}:generateContent` with the
//! `google_search` tool enabled. The grounding metadata of the answer lists
//! the web pages Google Search returned; those become [`SearchHit`]s.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agent::config::AgentConfig;
use crate::agent::search::{SearchHit, SearchProvider};
use crate::error::AgentError;

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
    #[serde(default)]
    grounding_supports: Vec<GroundingSupport>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingSupport {
    #[serde(default)]
    segment: Option<Segment>,
    #[serde(default)]
    grounding_chunk_indices: Vec<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct Segment {
    #[serde(default)]
    text: String,
}

/// Error body returned by the Gemini API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Google Search via Gemini grounding.
pub struct GeminiSearchProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiSearchProvider {
    /// Creates a search provider using the Hunter model and the search
    /// settings of `config`.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.search_api_key.clone(),
            base_url: config.search_base_url.clone(),
            model: config.hunter_model.clone(),
            timeout: config.timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl SearchProvider for GeminiSearchProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AgentError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: query.to_string(),
                }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .post(self.endpoint())
                .header("x-goog-api-key", &self.api_key)
                .json(&request)
                .send(),
        )
        .await
        .map_err(|_| AgentError::Timeout {
            seconds: self.timeout.as_secs(),
        })?
        .map_err(|e| AgentError::Search {
            message: e.to_string(),
            status: e.status().map(|s| s.as_u16()),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|body| body.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(AgentError::Search {
                message,
                status: Some(status.as_u16()),
            });
        }

        let body = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| AgentError::Search {
                message: format!("unreadable search response: {e}"),
                status: None,
            })?;

        let hits = hits_from(body);
        debug!(query, hits = hits.len(), "search completed");
        Ok(hits)
    }
}

/// Turns grounding metadata into hits, in the order Google returned them.
///
/// The snippet of a hit is the first answer segment that cites it. Chunks
/// without a web URI are skipped.
fn hits_from(response: GenerateResponse) -> Vec<SearchHit> {
    let Some(metadata) = response
        .candidates
        .into_iter()
        .find_map(|c| c.grounding_metadata)
    else {
        return Vec::new();
    };

    let mut snippets = vec![String::new(); metadata.grounding_chunks.len()];
    for support in &metadata.grounding_supports {
        let Some(segment) = &support.segment else {
            continue;
        };
        for &idx in &support.grounding_chunk_indices {
            if let Some(slot) = snippets.get_mut(idx)
                && slot.is_empty()
            {
                slot.clone_from(&segment.text);
            }
        }
    }

    metadata
        .grounding_chunks
        .into_iter()
        .zip(snippets)
        .filter_map(|(chunk, snippet)| {
            let web = chunk.web?;
            let url = web.uri.trim().to_string();
            if url.is_empty() {
                return None;
            }
            Some(SearchHit {
                title: web.title.trim().to_string(),
                snippet: snippet.trim().to_string(),
                url,
            })
        })
        .collect()
}
