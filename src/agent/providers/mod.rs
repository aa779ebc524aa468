//! Concrete [`LlmProvider`](super::provider::LlmProvider) and
//! [`SearchProvider`](super::search::SearchProvider) implementations.

pub mod gemini_search;
pub mod openai;

pub use gemini_search::GeminiSearchProvider;
pub use openai::OpenAiProvider;
