//! CLI layer for Sentinel.
//!
//! Provides the command-line interface using clap, with commands for
//! running analyses and browsing stats and history.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, HistoryCommands};
