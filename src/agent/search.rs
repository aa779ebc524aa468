//! Web search seam used by the Hunter.
//!
//! A [`SearchProvider`] turns one query into ranked web results. The Hunter
//! runs every planned query through it and lets the model pick from the
//! results, so discovered URLs come from a real index rather than from the
//! model's memory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// One web search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result URL.
    pub url: String,
    /// Page title (or the site name when the index has no title).
    pub title: String,
    /// Text the index associates with the result.
    pub snippet: String,
}

/// Trait for web search backends.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Backend name (e.g., `"gemini"`).
    fn name(&self) -> &'static str;

    /// Searches the web for `query`, best results first.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Search`] or [`AgentError::Timeout`] when the
    /// backend call fails.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AgentError>;
}
