//! Per-model token pricing.
//!
//! Rates are USD per 1,000 tokens, split into input (prompt) and output
//! (completion). Models missing from the table cost nothing: a pricing gap
//! must never block a run.

use std::collections::HashMap;

use tracing::debug;

use super::message::TokenUsage;

/// Input/output rates for one model, in USD per 1K tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelRate {
    /// Rate applied to prompt tokens.
    pub input_per_1k: f64,
    /// Rate applied to completion tokens.
    pub output_per_1k: f64,
}

impl ModelRate {
    /// Creates a rate pair.
    #[must_use]
    pub const fn new(input_per_1k: f64, output_per_1k: f64) -> Self {
        Self {
            input_per_1k,
            output_per_1k,
        }
    }
}

/// Lookup table from model identifier to [`ModelRate`].
#[derive(Debug, Clone, PartialEq)]
pub struct PricingTable {
    rates: HashMap<String, ModelRate>,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::empty()
            .with_rate("gemini-2.5-flash", ModelRate::new(0.000_075, 0.0003))
            .with_rate("gemini-2.5-flash-lite", ModelRate::new(0.000_075, 0.0003))
            .with_rate("gemini-3-pro-preview", ModelRate::new(0.001_25, 0.005))
    }
}

impl PricingTable {
    /// Creates a table with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    /// Adds or replaces the rate for `model`.
    #[must_use]
    pub fn with_rate(mut self, model: impl Into<String>, rate: ModelRate) -> Self {
        self.rates.insert(model.into(), rate);
        self
    }

    /// Returns the rate for `model`, if known.
    #[must_use]
    pub fn rate(&self, model: &str) -> Option<ModelRate> {
        self.rates.get(model).copied()
    }

    /// Estimates the cost of a call.
    ///
    /// `prompt/1000 × input + completion/1000 × output`; `0.0` for unknown
    /// models.
    #[must_use]
    pub fn cost(&self, model: &str, usage: &TokenUsage) -> f64 {
        let Some(rate) = self.rate(model) else {
            debug!(model, "no pricing entry, cost recorded as 0");
            return 0.0;
        };
        f64::from(usage.prompt_tokens) / 1000.0 * rate.input_per_1k
            + f64::from(usage.completion_tokens) / 1000.0 * rate.output_per_1k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test_case("gemini-2.5-flash", 1000, 1000, 0.000_375 ; "flash")]
    #[test_case("gemini-2.5-flash-lite", 2000, 0, 0.000_15 ; "flash lite prompt only")]
    #[test_case("gemini-3-pro-preview", 1000, 2000, 0.011_25 ; "pro")]
    #[test_case("some-unknown-model", 5000, 5000, 0.0 ; "unknown model is free")]
    fn test_cost(model: &str, prompt: u32, completion: u32, expected: f64) {
        let table = PricingTable::default();
        let cost = table.cost(model, &TokenUsage::new(prompt, completion));
        assert!(approx_eq(cost, expected), "{cost} != {expected}");
    }

    #[test]
    fn test_with_rate_overrides() {
        let table =
            PricingTable::default().with_rate("gemini-2.5-flash", ModelRate::new(1.0, 2.0));
        let cost = table.cost("gemini-2.5-flash", &TokenUsage::new(500, 500));
        assert!(approx_eq(cost, 1.5));
    }

    #[test]
    fn test_zero_usage_costs_nothing() {
        let table = PricingTable::default();
        assert!(approx_eq(
            table.cost("gemini-3-pro-preview", &TokenUsage::default()),
            0.0
        ));
    }
}
