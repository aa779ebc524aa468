//! Response parsing shared by the JSON-mode stages.
//!
//! Models occasionally wrap JSON in markdown fences even in JSON mode, so
//! fences are stripped before parsing. Parsed values are then checked with
//! the small `require`/`clean_list` helpers; any violation is a
//! [`AgentError::SchemaViolation`].

use serde::de::DeserializeOwned;

use super::traits::AgentResponse;
use crate::error::AgentError;

/// Strips a surrounding markdown code fence, if any.
#[must_use]
pub fn strip_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```markdown")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    }
}

/// Parses a JSON-mode response into `T`.
///
/// # Errors
///
/// Returns [`AgentError::ResponseParse`] if the content is not valid JSON for
/// `T`. When the response was truncated, the message says so and names the
/// token budget.
pub fn parse_response<T: DeserializeOwned>(
    response: &AgentResponse,
    max_tokens: u32,
) -> Result<T, AgentError> {
    let json_str = strip_fences(&response.content);

    serde_json::from_str(json_str).map_err(|e| {
        let message = if response.truncated() {
            format!(
                "Response truncated (finish_reason=length, max_tokens={max_tokens}). \
                 Consider raising SENTINEL_MAX_TOKENS."
            )
        } else {
            format!("Invalid JSON: {e}")
        };
        AgentError::ResponseParse {
            message,
            content: response.content.clone(),
        }
    })
}

/// Fails with [`AgentError::SchemaViolation`] unless `condition` holds.
///
/// # Errors
///
/// Returns the violation carrying `message`.
pub fn require(condition: bool, message: impl FnOnce() -> String) -> Result<(), AgentError> {
    if condition {
        Ok(())
    } else {
        Err(AgentError::SchemaViolation { message: message() })
    }
}

/// Trims every entry and drops blank ones.
#[must_use]
pub fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
