//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::agent::{AgentConfig, PromptSet, create_provider, create_search_provider};
use crate::cli::output::{
    OutputFormat, format_comparison, format_history_list, format_run, format_run_detail,
    format_stats,
};
use crate::cli::parser::{Cli, Commands, HistoryCommands};
use crate::core::RunStatus;
use crate::error::{CommandError, Result, StorageError};
use crate::storage::{HISTORY_KEY, KeyValueStore, STATS_KEY, SqliteStore};
use crate::workflow::{
    Comparison, Dashboard, History, Orchestrator, RunControl, WorkflowStats, load_history,
    load_stats,
};

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute. A failed workflow
/// yields [`CommandError::WorkflowFailed`] carrying the rendered partial
/// results.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Analyze { query, prompt_dir } => cmd_analyze(
            &db_path,
            &query.join(" "),
            prompt_dir.as_deref(),
            cli.verbose,
            format,
        ),
        Commands::History(HistoryCommands::List) => cmd_history_list(&db_path, format),
        Commands::History(HistoryCommands::Show { id }) => cmd_history_show(&db_path, id, format),
        Commands::Compare { left, right } => cmd_compare(&db_path, left, right, format),
        Commands::Stats => cmd_stats(&db_path, format),
        Commands::Clear { yes } => cmd_clear(&db_path, *yes, format),
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
    }
}

// ==================== Command Implementations ====================

fn cmd_analyze(
    db_path: &Path,
    query: &str,
    prompt_dir: Option<&Path>,
    verbose: bool,
    format: OutputFormat,
) -> Result<String> {
    let mut builder = AgentConfig::builder().from_env();
    if let Some(dir) = prompt_dir {
        builder = builder.prompt_dir(dir);
    }

    let config = builder.build().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}"))
    })?;

    let provider = create_provider(&config)
        .map_err(|e| CommandError::ExecutionFailed(format!("Provider creation failed: {e}")))?;
    let search = create_search_provider(&config)
        .map_err(|e| CommandError::ExecutionFailed(format!("Search setup failed: {e}")))?;

    let store = SqliteStore::open(db_path)?;
    let mut orchestrator = Orchestrator::new(provider, config);
    if let Some(search) = search {
        orchestrator = orchestrator.with_search(search);
    }
    let mut dashboard = Dashboard::load(orchestrator, Box::new(store));

    // Create tokio runtime as sync/async bridge
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;

    let state = rt.block_on(async {
        let control = dashboard.control();
        let interrupt = tokio::spawn(async move {
            if watch_interrupts(tokio::signal::ctrl_c, control).await {
                std::process::exit(130);
            }
        });
        let result = dashboard.analyze(query).await;
        interrupt.abort();
        result
    })?;

    let output = format_run(&state, verbose, format);
    if state.status == RunStatus::Failed {
        let reason = state
            .error_logs()
            .next()
            .map(|log| log.message.clone())
            .unwrap_or_default();
        return Err(CommandError::WorkflowFailed { reason, output }.into());
    }

    Ok(output)
}

/// Cancels the run on the first interrupt.
///
/// Returns `true` when a second interrupt arrives, in which case the caller
/// aborts the process. Returns `false` if the signal source fails.
async fn watch_interrupts<F, Fut>(mut next_signal: F, control: RunControl) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_signal().await.is_err() {
        return false;
    }
    warn!("interrupt received; cancelling before the next stage (press Ctrl-C again to abort)");
    control.cancel();

    if next_signal().await.is_err() {
        return false;
    }
    warn!("second interrupt received; aborting");
    true
}

fn cmd_history_list(db_path: &Path, format: OutputFormat) -> Result<String> {
    let store = SqliteStore::open(db_path)?;
    Ok(format_history_list(&load_history(&store), format))
}

fn cmd_history_show(db_path: &Path, id: &str, format: OutputFormat) -> Result<String> {
    let store = SqliteStore::open(db_path)?;
    let history = load_history(&store);
    let entry = history.find(id)?;
    Ok(format_run_detail(entry, format))
}

fn cmd_compare(db_path: &Path, left: &str, right: &str, format: OutputFormat) -> Result<String> {
    let store = SqliteStore::open(db_path)?;
    let history = load_history(&store);
    let comparison = Comparison::new(history.find(left)?.clone(), history.find(right)?.clone());
    Ok(format_comparison(&comparison, format))
}

fn cmd_stats(db_path: &Path, format: OutputFormat) -> Result<String> {
    let store = SqliteStore::open(db_path)?;
    Ok(format_stats(&load_stats(&store), format))
}

fn cmd_clear(db_path: &Path, yes: bool, format: OutputFormat) -> Result<String> {
    if !yes {
        return Err(CommandError::ExecutionFailed(
            "Use --yes to confirm. This deletes all stats and history.".to_string(),
        )
        .into());
    }

    let mut store = SqliteStore::open(db_path)?;
    let stats = serde_json::to_string(&WorkflowStats::default()).map_err(StorageError::from)?;
    let history = serde_json::to_string(&History::default()).map_err(StorageError::from)?;
    store.set(STATS_KEY, &stats)?;
    store.set(HISTORY_KEY, &history)?;

    match format {
        OutputFormat::Text => Ok("Sentinel stats and history cleared.\n".to_string()),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "success": true,
                "path": db_path.to_string_lossy(),
            });
            Ok(format.to_json(&json))
        }
    }
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ))
            } else {
                let mut output = format!(
                    "Wrote {} prompt template(s) to: {}\n",
                    written.len(),
                    target_dir.display()
                );
                for path in &written {
                    output.push_str("  ");
                    output.push_str(
                        path.file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("unknown"),
                    );
                    output.push('\n');
                }
                output.push_str("\nEdit these files to customize agent system prompts.\n");
                Ok(output)
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len()
            });
            Ok(format.to_json(&json))
        }
    }
}
