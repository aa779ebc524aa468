//! Provider selection.

use std::sync::Arc;

use tracing::info;

use crate::agent::config::AgentConfig;
use crate::agent::provider::LlmProvider;
use crate::agent::providers::{GeminiSearchProvider, OpenAiProvider};
use crate::agent::search::SearchProvider;
use crate::error::AgentError;

/// Builds the shared provider named by `config.provider`.
///
/// `openai` and `gemini` (case-insensitive) both select the
/// `OpenAI`-compatible client; Gemini is reached through its compatibility
/// endpoint, which is the default base URL.
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for any other name.
pub fn create_provider(config: &AgentConfig) -> Result<Arc<dyn LlmProvider>, AgentError> {
    let name = config.provider.trim().to_ascii_lowercase();
    let provider: Arc<dyn LlmProvider> = match name.as_str() {
        "openai" | "gemini" => Arc::new(OpenAiProvider::new(config)),
        _ => {
            return Err(AgentError::UnsupportedProvider {
                name: config.provider.clone(),
            });
        }
    };
    info!(provider = %name, base_url = %config.base_url, "model provider ready");
    Ok(provider)
}

/// Builds the web search backend named by `config.search_provider`.
///
/// Returns `None` for `none`, in which case the Hunter falls back to
/// model-suggested sources.
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for an unknown name.
pub fn create_search_provider(
    config: &AgentConfig,
) -> Result<Option<Arc<dyn SearchProvider>>, AgentError> {
    let name = config.search_provider.trim().to_ascii_lowercase();
    match name.as_str() {
        "gemini" | "google" => {
            info!(search = %name, model = %config.hunter_model, "web search ready");
            Ok(Some(Arc::new(GeminiSearchProvider::new(config))))
        }
        "none" | "off" => {
            info!("web search disabled; sources will be model-suggested");
            Ok(None)
        }
        _ => Err(AgentError::UnsupportedProvider {
            name: config.search_provider.clone(),
        }),
    }
}
