//! Cumulative workflow statistics.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::LogEntry;

fn default_success_rate() -> f64 {
    100.0
}

/// Aggregate counters across all runs.
///
/// Token and cost totals only grow; [`WorkflowStats::default`] (via an
/// explicit clear) is the only reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStats {
    /// Runs started.
    pub total_workflows: u64,
    /// Runs that reached `completed`.
    #[serde(default)]
    pub completed_workflows: u64,
    /// `completed / total × 100`; 100 when no run has started.
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
    /// Mean duration of completed runs.
    pub avg_execution_time_ms: f64,
    /// Tokens consumed across all runs.
    pub total_tokens: u64,
    /// Estimated spend in USD across all runs.
    pub total_cost: f64,
    /// Duration of the most recent completed run.
    pub last_execution_time_ms: f64,
}

impl Default for WorkflowStats {
    fn default() -> Self {
        Self {
            total_workflows: 0,
            completed_workflows: 0,
            success_rate: default_success_rate(),
            avg_execution_time_ms: 0.0,
            total_tokens: 0,
            total_cost: 0.0,
            last_execution_time_ms: 0.0,
        }
    }
}

impl WorkflowStats {
    /// Counts a new run.
    pub fn record_workflow_start(&mut self) {
        self.total_workflows = self.total_workflows.saturating_add(1);
        self.refresh_success_rate();
    }

    /// Adds one log entry's tokens and cost.
    ///
    /// Negative or non-finite costs are ignored so the total never shrinks.
    pub fn record_token_usage(&mut self, tokens: u32, cost: f64) {
        self.total_tokens = self.total_tokens.saturating_add(u64::from(tokens));
        if cost.is_finite() && cost > 0.0 {
            self.total_cost += cost;
        }
    }

    /// Adds the tokens and cost carried by `entry`, if any.
    pub fn record_log(&mut self, entry: &LogEntry) {
        self.record_token_usage(entry.token_usage.unwrap_or(0), entry.cost.unwrap_or(0.0));
    }

    /// Counts a completed run and folds `elapsed` into the running mean.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_completion(&mut self, elapsed: Duration) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        self.completed_workflows = self.completed_workflows.saturating_add(1);
        let n = self.completed_workflows as f64;
        self.avg_execution_time_ms += (elapsed_ms - self.avg_execution_time_ms) / n;
        self.last_execution_time_ms = elapsed_ms;
        self.refresh_success_rate();
    }

    #[allow(clippy::cast_precision_loss)]
    fn refresh_success_rate(&mut self) {
        self.success_rate = if self.total_workflows == 0 {
            default_success_rate()
        } else {
            self.completed_workflows as f64 / self.total_workflows as f64 * 100.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_completion_sets_average() {
        let mut stats = WorkflowStats::default();
        stats.record_workflow_start();
        stats.record_completion(Duration::from_millis(4200));
        assert!((stats.avg_execution_time_ms - 4200.0).abs() < f64::EPSILON);
        assert!((stats.last_execution_time_ms - 4200.0).abs() < f64::EPSILON);
        assert!((stats.success_rate - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_ignores_failed_runs() {
        let mut stats = WorkflowStats::default();
        stats.record_workflow_start();
        stats.record_completion(Duration::from_millis(1000));
        stats.record_workflow_start();
        stats.record_workflow_start();
        stats.record_completion(Duration::from_millis(3000));
        assert!((stats.avg_execution_time_ms - 2000.0).abs() < 1e-9);
        assert!((stats.success_rate - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_success_rate_defaults_to_100() {
        let stats = WorkflowStats::default();
        assert!((stats.success_rate - 100.0).abs() < f64::EPSILON);
        let mut failing = WorkflowStats::default();
        failing.record_workflow_start();
        assert!(failing.success_rate.abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_cost_ignored() {
        let mut stats = WorkflowStats::default();
        stats.record_token_usage(10, -1.0);
        stats.record_token_usage(10, f64::NAN);
        assert_eq!(stats.total_tokens, 20);
        assert!(stats.total_cost.abs() < f64::EPSILON);
    }

    #[test]
    fn test_legacy_json_without_completed_count() {
        let json = r#"{"totalWorkflows":3,"avgExecutionTimeMs":10.0,"totalTokens":5,
                       "totalCost":0.5,"lastExecutionTimeMs":12.0}"#;
        let stats: WorkflowStats = serde_json::from_str(json).unwrap_or_default();
        assert_eq!(stats.total_workflows, 3);
        assert_eq!(stats.completed_workflows, 0);
        assert!((stats.success_rate - 100.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn totals_never_decrease(usages in prop::collection::vec((0u32..100_000, -1.0f64..1.0), 0..50)) {
            let mut stats = WorkflowStats::default();
            for (tokens, cost) in usages {
                let before = (stats.total_tokens, stats.total_cost);
                stats.record_token_usage(tokens, cost);
                prop_assert!(stats.total_tokens >= before.0);
                prop_assert!(stats.total_cost >= before.1);
            }
        }

        #[test]
        fn success_rate_in_range(starts in 1u64..50, completions in 0u64..50) {
            let mut stats = WorkflowStats::default();
            for _ in 0..starts {
                stats.record_workflow_start();
            }
            for _ in 0..completions.min(starts) {
                stats.record_completion(Duration::from_millis(5));
            }
            prop_assert!((0.0..=100.0).contains(&stats.success_rate));
        }
    }
}
