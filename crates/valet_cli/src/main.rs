//! Valet CLI
//!
//! Runs the Vale prose linter on files, applies its fixes, and serves
//! editors over LSP.

mod cli;
mod commands;
mod output;
mod utils;

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::{run_check, run_fix, run_init, run_lsp};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::from(1),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

/// Runs a subcommand. `Ok(true)` means it finished but found problems.
fn run(cli: &Cli) -> Result<bool> {
    match &cli.command {
        Commands::Check { files, ext, format } => run_check(cli, files, ext.as_deref(), *format),
        Commands::Fix { files, dry_run } => run_fix(cli, files, *dry_run),
        Commands::Init { force } => run_init(*force).map(|_| false),
        Commands::Lsp => run_lsp().map(|_| false),
    }
}
