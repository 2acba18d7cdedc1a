//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Valet - run the Vale prose linter from the command line or your editor
#[derive(Parser)]
#[command(name = "valet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the Vale executable (overrides the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub vale_path: Option<PathBuf>,

    /// Path to Vale's own .vale.ini (overrides the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub vale_config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check files with Vale
    Check {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Format hint passed to Vale (defaults to each file's extension)
        #[arg(long)]
        ext: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Apply Vale's suggested fixes
    Fix {
        /// Files to fix
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Preview fixes without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Start the LSP server
    Lsp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
