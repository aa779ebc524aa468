//! Sentinel CLI entry point.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use sentinel_ci::cli::{Cli, execute};
use sentinel_ci::error::{CommandError, Error};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "sentinel_ci=debug"
    } else {
        "sentinel_ci=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut stdout = std::io::stdout().lock();
    match execute(&cli) {
        Ok(output) => {
            stdout.write_all(output.as_bytes())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::Command(CommandError::WorkflowFailed { output, .. })) => {
            stdout.write_all(output.as_bytes())?;
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
