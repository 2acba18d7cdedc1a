//! Subcommand implementations

mod check;
mod fix;
mod init;
mod lsp;

pub use check::{FileReport, run_check};
pub use fix::run_fix;
pub use init::run_init;
pub use lsp::run_lsp;

use std::path::Path;

use miette::{IntoDiagnostic, Result};
use tracing::info;
use valet_core::ValetConfig;

use crate::cli::Cli;

/// Loads the configuration and applies command-line overrides.
///
/// Override paths are taken relative to the working directory.
pub fn load_config(cli: &Cli) -> Result<ValetConfig> {
    let mut config = match &cli.config {
        Some(path) => ValetConfig::from_file(path).into_diagnostic()?,
        None => find_config(Path::new("."))?,
    };

    if let Some(path) = &cli.vale_path {
        config.cli.vale_path = Some(std::path::absolute(path).into_diagnostic()?);
    }
    if let Some(path) = &cli.vale_config {
        config.cli.config_path = Some(std::path::absolute(path).into_diagnostic()?);
    }

    Ok(config)
}

pub fn find_config(dir: &Path) -> Result<ValetConfig> {
    if let Some(path) = ValetConfig::discover(dir) {
        info!("Using config: {}", path.display());
        return ValetConfig::from_file(&path).into_diagnostic();
    }

    info!("No config file found, using defaults");
    Ok(ValetConfig::new())
}
