//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::storage::DEFAULT_DB_PATH;

/// Sentinel: competitive intelligence reports from a five-stage agent pipeline.
///
/// Runs Router → Hunter → Scraper → Analyst → Reporter against an
/// OpenAI-compatible model API and keeps cumulative stats and a history of
/// completed reports.
#[derive(Parser, Debug)]
#[command(name = "sentinel")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the Sentinel database file.
    ///
    /// Defaults to `.sentinel/sentinel.db` in the current directory.
    #[arg(short, long, env = "SENTINEL_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline for a query and print the report.
    ///
    /// Press Ctrl-C to cancel; the run stops before its next stage.
    #[command(after_help = r#"Examples:
  sentinel analyze "Analyze OpenAI's pricing"
  sentinel analyze What did Anthropic announce this month
  sentinel --verbose analyze "Stripe features"      # Include the run log
  sentinel --format json analyze "Vercel pricing" | jq '.swotAnalysis.scores'
"#)]
    Analyze {
        /// The query (words are joined with spaces).
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Directory containing prompt template files.
        #[arg(long)]
        prompt_dir: Option<PathBuf>,
    },

    /// Browse completed reports.
    #[command(subcommand)]
    History(HistoryCommands),

    /// Compare two completed reports side by side.
    #[command(after_help = r#"Examples:
  sentinel compare 3f2a9c1e 8b41d07a    # Unique id prefixes are enough
"#)]
    Compare {
        /// First report id (or unique prefix).
        left: String,

        /// Second report id (or unique prefix).
        right: String,
    },

    /// Show cumulative workflow statistics.
    Stats,

    /// Delete all stats and history.
    Clear {
        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Write the default prompt templates for customization.
    ///
    /// Existing files are left untouched.
    InitPrompts {
        /// Target directory (defaults to ~/.config/sentinel/prompts).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

/// History subcommands.
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List completed reports, newest first.
    #[command(alias = "ls")]
    List,

    /// Show one report with its SWOT, sources and log.
    Show {
        /// Report id (or unique prefix).
        id: String,
    },
}

impl Cli {
    /// Returns the database path, using default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }
}
