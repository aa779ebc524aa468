//! LLM agents for the Sentinel pipeline.
//!
//! Each stage is an agent with a fixed system prompt, a configured model
//! and a strict parser for its response. Agents talk to the model through
//! a pluggable provider abstraction backed by OpenAI-compatible APIs.
//!
//! # Architecture
//!
//! ```text
//! query → RouterAgent   (company, analysis type, search queries)
//!       → HunterAgent   (ordered sources, picked from web search results)
//!       → ScraperAgent  (per-source extracts + aggregated text)
//!       → AnalystAgent  (SWOT + strategic scores)
//!       → ReporterAgent (markdown report)
//! ```
//!
//! Every stage returns its output plus a [`LogEntry`](crate::core::LogEntry)
//! carrying latency, token usage and cost, or a
//! [`StageError`](crate::error::StageError) naming the stage.

pub mod analyst;
pub mod client;
pub mod config;
pub mod hunter;
pub mod message;
pub mod pricing;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod reporter;
pub mod router;
pub mod schema;
pub mod scraper;
pub mod search;
pub mod traits;

// Re-export key types
pub use analyst::{AnalystAgent, AnalystOutput};
pub use client::{create_provider, create_search_provider};
pub use config::AgentConfig;
pub use hunter::{HunterAgent, HunterOutput};
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use pricing::{ModelRate, PricingTable};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use reporter::{ReporterAgent, ReporterOutput};
pub use router::{RouterAgent, RouterOutput};
pub use scraper::{ScraperAgent, ScraperOutput};
pub use search::{SearchHit, SearchProvider};
pub use traits::{Agent, AgentResponse};
