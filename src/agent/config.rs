//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use super::pricing::PricingTable;
use crate::core::AgentRole;
use crate::error::AgentError;

/// Gemini's `OpenAI`-compatible endpoint, used when no base URL is set.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
/// Gemini's native API root, used for grounded web search.
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
/// Default model for the Router, Hunter, Scraper and Reporter.
pub const DEFAULT_FAST_MODEL: &str = "gemini-2.5-flash";
/// Default model for the Analyst.
pub const DEFAULT_ANALYST_MODEL: &str = "gemini-3-pro-preview";
/// Default max tokens for short structured stages.
const DEFAULT_MAX_TOKENS: u32 = 2048;
/// Default max tokens for the Analyst and Reporter.
const DEFAULT_LONG_MAX_TOKENS: u32 = 4096;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the agent system.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Base URL of the `OpenAI`-compatible API.
    pub base_url: String,
    /// Web search backend for the Hunter (`gemini`, or `none` to disable).
    pub search_provider: String,
    /// API key for the search backend.
    pub search_api_key: String,
    /// Base URL of the search backend.
    pub search_base_url: String,
    /// Model for the Router stage.
    pub router_model: String,
    /// Model for the Hunter stage.
    pub hunter_model: String,
    /// Model for the Scraper stage.
    pub scraper_model: String,
    /// Model for the Analyst stage.
    pub analyst_model: String,
    /// Model for the Reporter stage.
    pub reporter_model: String,
    /// Maximum tokens for Router, Hunter and Scraper responses.
    pub max_tokens: u32,
    /// Maximum tokens for Analyst and Reporter responses.
    pub long_max_tokens: u32,
    /// Request timeout applied to every model call.
    pub timeout: Duration,
    /// Directory containing prompt template files.
    ///
    /// Missing files fall back to compiled-in defaults.
    pub prompt_dir: Option<PathBuf>,
    /// Per-model token pricing.
    pub pricing: PricingTable,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }

    /// Returns the model configured for `role`.
    #[must_use]
    pub fn model_for(&self, role: AgentRole) -> &str {
        match role {
            AgentRole::Router => &self.router_model,
            AgentRole::Hunter => &self.hunter_model,
            AgentRole::Scraper => &self.scraper_model,
            AgentRole::Analyst => &self.analyst_model,
            AgentRole::Reporter => &self.reporter_model,
        }
    }

    /// Returns the response token budget for `role`.
    #[must_use]
    pub const fn max_tokens_for(&self, role: AgentRole) -> u32 {
        match role {
            AgentRole::Router | AgentRole::Hunter | AgentRole::Scraper => self.max_tokens,
            AgentRole::Analyst | AgentRole::Reporter => self.long_max_tokens,
        }
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    search_provider: Option<String>,
    search_api_key: Option<String>,
    search_base_url: Option<String>,
    router_model: Option<String>,
    hunter_model: Option<String>,
    scraper_model: Option<String>,
    analyst_model: Option<String>,
    reporter_model: Option<String>,
    max_tokens: Option<u32>,
    long_max_tokens: Option<u32>,
    timeout: Option<Duration>,
    prompt_dir: Option<PathBuf>,
    pricing: Option<PricingTable>,
}

fn env_model(role: AgentRole) -> Option<String> {
    std::env::var(format!("SENTINEL_{}_MODEL", role.as_str())).ok()
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("SENTINEL_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("SENTINEL_API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("SENTINEL_BASE_URL")
                .or_else(|_| std::env::var("OPENAI_BASE_URL"))
                .ok();
        }
        if self.search_provider.is_none() {
            self.search_provider = std::env::var("SENTINEL_SEARCH_PROVIDER").ok();
        }
        if self.search_api_key.is_none() {
            self.search_api_key = std::env::var("SENTINEL_SEARCH_API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .ok();
        }
        if self.search_base_url.is_none() {
            self.search_base_url = std::env::var("SENTINEL_SEARCH_BASE_URL").ok();
        }
        if self.router_model.is_none() {
            self.router_model = env_model(AgentRole::Router);
        }
        if self.hunter_model.is_none() {
            self.hunter_model = env_model(AgentRole::Hunter);
        }
        if self.scraper_model.is_none() {
            self.scraper_model = env_model(AgentRole::Scraper);
        }
        if self.analyst_model.is_none() {
            self.analyst_model = env_model(AgentRole::Analyst);
        }
        if self.reporter_model.is_none() {
            self.reporter_model = env_model(AgentRole::Reporter);
        }
        if self.max_tokens.is_none() {
            self.max_tokens = std::env::var("SENTINEL_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.timeout.is_none() {
            self.timeout = std::env::var("SENTINEL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("SENTINEL_PROMPT_DIR").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the web search backend name.
    #[must_use]
    pub fn search_provider(mut self, name: impl Into<String>) -> Self {
        self.search_provider = Some(name.into());
        self
    }

    /// Sets the search backend API key. Defaults to the model API key.
    #[must_use]
    pub fn search_api_key(mut self, key: impl Into<String>) -> Self {
        self.search_api_key = Some(key.into());
        self
    }

    /// Sets the search backend base URL.
    #[must_use]
    pub fn search_base_url(mut self, url: impl Into<String>) -> Self {
        self.search_base_url = Some(url.into());
        self
    }

    /// Sets the model for one stage.
    #[must_use]
    pub fn model(mut self, role: AgentRole, model: impl Into<String>) -> Self {
        let model = Some(model.into());
        match role {
            AgentRole::Router => self.router_model = model,
            AgentRole::Hunter => self.hunter_model = model,
            AgentRole::Scraper => self.scraper_model = model,
            AgentRole::Analyst => self.analyst_model = model,
            AgentRole::Reporter => self.reporter_model = model,
        }
        self
    }

    /// Sets the max tokens for Router, Hunter and Scraper.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the max tokens for Analyst and Reporter.
    #[must_use]
    pub const fn long_max_tokens(mut self, n: u32) -> Self {
        self.long_max_tokens = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Replaces the pricing table.
    #[must_use]
    pub fn pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = Some(pricing);
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;
        let fast = || DEFAULT_FAST_MODEL.to_string();

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            search_provider: self
                .search_provider
                .unwrap_or_else(|| "gemini".to_string()),
            search_api_key: self.search_api_key.unwrap_or_else(|| api_key.clone()),
            search_base_url: self
                .search_base_url
                .unwrap_or_else(|| DEFAULT_SEARCH_BASE_URL.to_string()),
            api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            router_model: self.router_model.unwrap_or_else(fast),
            hunter_model: self.hunter_model.unwrap_or_else(fast),
            scraper_model: self.scraper_model.unwrap_or_else(fast),
            analyst_model: self
                .analyst_model
                .unwrap_or_else(|| DEFAULT_ANALYST_MODEL.to_string()),
            reporter_model: self.reporter_model.unwrap_or_else(fast),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            long_max_tokens: self.long_max_tokens.unwrap_or(DEFAULT_LONG_MAX_TOKENS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            prompt_dir: self.prompt_dir,
            pricing: self.pricing.unwrap_or_default(),
        })
    }
}
