//! Output formatting for CLI commands.
//!
//! Every formatter renders either human-readable text or JSON, selected by
//! [`OutputFormat`].

#![allow(clippy::format_push_string)]

use std::fmt::Write;

use serde::Serialize;

use crate::core::{LogEntry, LogKind, RunState, SourceOrigin, Swot};
use crate::workflow::{Comparison, History, WorkflowStats};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name, defaulting to text for unknown values.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes `value` as pretty JSON followed by a newline.
    #[must_use]
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> String {
        serde_json::to_string_pretty(value)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}\n"))
    }
}

/// Tokens and cost summed over a run's log.
fn run_totals(state: &RunState) -> (u64, f64) {
    state.logs.iter().fold((0, 0.0), |(tokens, cost), log| {
        (
            tokens + u64::from(log.token_usage.unwrap_or(0)),
            cost + log.cost.unwrap_or(0.0),
        )
    })
}

fn format_log_line(out: &mut String, log: &LogEntry) {
    let marker = match log.kind {
        LogKind::Success => "✓",
        LogKind::Error => "✗",
        LogKind::Warning => "!",
        LogKind::Info => "·",
    };
    let _ = write!(
        out,
        "  {marker} {} [{:<8}] {}",
        log.timestamp.format("%H:%M:%S"),
        log.agent.as_str(),
        log.message
    );
    if let Some(ms) = log.latency_ms {
        let _ = write!(out, " ({ms} ms");
        if let Some(tokens) = log.token_usage {
            let _ = write!(out, ", {tokens} tokens");
        }
        if let Some(cost) = log.cost {
            let _ = write!(out, ", ${cost:.6}");
        }
        out.push(')');
    }
    out.push('\n');
}

fn format_swot(out: &mut String, swot: &Swot) {
    out.push_str("SWOT\n");
    for (name, items) in swot.quadrants() {
        let _ = writeln!(out, "  {name}:");
        for item in items {
            let _ = writeln!(out, "    - {item}");
        }
    }
    out.push_str("Scores\n");
    for (dimension, score) in swot.scores.dimensions() {
        let _ = writeln!(out, "  {dimension:<17} {score:>3}");
    }
}

fn format_summary_line(out: &mut String, state: &RunState) {
    let (tokens, cost) = run_totals(state);
    let _ = writeln!(
        out,
        "Run: {} | Status: {} | Company: {} | Type: {} | Sources: {} | Tokens: {} | Cost: ${:.6}",
        state.short_id(),
        state.status,
        if state.target_company.is_empty() {
            "-"
        } else {
            state.target_company.as_str()
        },
        state.analysis_type.map_or("-", |t| t.as_str()),
        state.discovered_urls.len(),
        tokens,
        cost
    );
}

/// Formats the result of an `analyze` run.
///
/// Text output is the report followed by a summary line; `verbose` adds the
/// run log (oldest first).
#[must_use]
pub fn format_run(state: &RunState, verbose: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            if let Some(report) = state.report() {
                out.push_str(report);
                out.push_str("\n\n");
            } else if let Some(err) = state.error_logs().next() {
                let _ = writeln!(out, "{} stage failed: {}\n", err.agent, err.message);
            }
            out.push_str("---\n");
            format_summary_line(&mut out, state);
            format_origin_note(&mut out, state);
            if verbose {
                out.push_str("Log\n");
                for log in state.logs.iter().rev() {
                    format_log_line(&mut out, log);
                }
            }
            out
        }
        OutputFormat::Json => format.to_json(state),
    }
}

/// Flags runs whose sources were suggested by the model rather than found
/// by web search.
fn format_origin_note(out: &mut String, state: &RunState) {
    let suggested = state
        .discovered_urls
        .iter()
        .filter(|s| s.origin == SourceOrigin::Model)
        .count();
    if suggested > 0 {
        let _ = writeln!(
            out,
            "Note: {suggested} of {} sources are model-suggested (no web search); verify them before relying on the report.",
            state.discovered_urls.len()
        );
    }
}

/// Formats one history entry in full.
#[must_use]
pub fn format_run_detail(state: &RunState, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            let id = state.workflow_id.map(|id| id.to_string()).unwrap_or_default();
            let _ = writeln!(out, "Workflow: {id}");
            let _ = writeln!(out, "Query:    {}", state.query);
            if let Some(ts) = state.timestamp {
                let _ = writeln!(out, "Started:  {}", ts.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            format_summary_line(&mut out, state);
            format_origin_note(&mut out, state);

            if !state.search_queries.is_empty() {
                out.push_str("\nSearch queries\n");
                for q in &state.search_queries {
                    let _ = writeln!(out, "  - {q}");
                }
            }
            if !state.discovered_urls.is_empty() {
                out.push_str("\nSources\n");
                for (i, s) in state.discovered_urls.iter().enumerate() {
                    let _ = writeln!(out, "  {}. {} <{}> [{}]", i + 1, s.title, s.url, s.origin);
                }
            }
            if let Some(swot) = &state.swot_analysis {
                out.push('\n');
                format_swot(&mut out, swot);
            }
            if let Some(report) = state.report() {
                out.push('\n');
                out.push_str(report);
                out.push('\n');
            }
            out.push_str("\nLog\n");
            for log in state.logs.iter().rev() {
                format_log_line(&mut out, log);
            }
            out
        }
        OutputFormat::Json => format.to_json(state),
    }
}

/// Formats the history list.
#[must_use]
pub fn format_history_list(history: &History, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if history.is_empty() {
                return "No completed reports.\n".to_string();
            }
            let mut out = format!("{} completed report(s)\n\n", history.len());
            let _ = writeln!(
                out,
                "{:<8}  {:<19}  {:<20}  {:<13}  Query",
                "ID", "Started", "Company", "Type"
            );
            for state in history.list() {
                let started = state
                    .timestamp
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "{:<8}  {:<19}  {:<20}  {:<13}  {}",
                    state.short_id(),
                    started,
                    state.target_company,
                    state.analysis_type.map_or("-", |t| t.as_str()),
                    state.query
                );
            }
            out
        }
        OutputFormat::Json => {
            let entries: Vec<_> = history
                .list()
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "workflowId": s.workflow_id,
                        "timestamp": s.timestamp,
                        "query": s.query,
                        "targetCompany": s.target_company,
                        "analysisType": s.analysis_type,
                    })
                })
                .collect();
            format.to_json(&entries)
        }
    }
}

/// Formats a two-run comparison.
#[must_use]
pub fn format_comparison(cmp: &Comparison, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "{:<17}  {:>12}  {:>12}  {:>6}",
                "",
                truncate(&label(&cmp.left), 12),
                truncate(&label(&cmp.right), 12),
                "Δ"
            );
            match &cmp.score_deltas {
                Some(deltas) => {
                    for d in deltas {
                        let _ = writeln!(
                            out,
                            "{:<17}  {:>12}  {:>12}  {:>+6}",
                            d.dimension, d.left, d.right, d.delta
                        );
                    }
                }
                None => out.push_str("(scores unavailable: a run has no SWOT analysis)\n"),
            }
            for (title, state) in [("Left", &cmp.left), ("Right", &cmp.right)] {
                let _ = writeln!(out, "\n{title}: {}", state.query);
                if let Some(swot) = &state.swot_analysis {
                    format_swot(&mut out, swot);
                }
            }
            out
        }
        OutputFormat::Json => format.to_json(cmp),
    }
}

fn label(state: &RunState) -> String {
    if state.target_company.is_empty() {
        state.short_id()
    } else {
        state.target_company.clone()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Formats cumulative stats.
#[must_use]
pub fn format_stats(stats: &WorkflowStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = String::from("Sentinel Statistics\n");
            out.push_str("===================\n");
            let _ = writeln!(out, "Workflows:        {}", stats.total_workflows);
            let _ = writeln!(out, "Completed:        {}", stats.completed_workflows);
            let _ = writeln!(out, "Success rate:     {:.1}%", stats.success_rate);
            let _ = writeln!(
                out,
                "Avg time:         {:.1}s",
                stats.avg_execution_time_ms / 1000.0
            );
            let _ = writeln!(
                out,
                "Last time:        {:.1}s",
                stats.last_execution_time_ms / 1000.0
            );
            let _ = writeln!(out, "Total tokens:     {}", stats.total_tokens);
            let _ = writeln!(out, "Total cost:       ${:.6}", stats.total_cost);
            out
        }
        OutputFormat::Json => format.to_json(stats),
    }
}
