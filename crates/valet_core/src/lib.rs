//! # valet_core
//!
//! Talks to the Vale prose linter for Valet.
//!
//! This crate provides:
//! - The finding model and Vale's response envelope
//! - Executable and config resolution
//! - Process invocation over stdin, and the Vale server transport
//! - The single-flight `CheckRunner`
//! - Configuration loading
//!
//! ## Example
//!
//! ```rust,ignore
//! use valet_core::ValetConfig;
//!
//! let config = ValetConfig::from_file(".valet.jsonc")?;
//! let runner = config.runner();
//!
//! let findings = runner.run("This is is prose.", ".md").await?;
//! for finding in findings.first_file_findings() {
//!     println!("{}:{} {}", finding.line, finding.span[0], finding.message);
//! }
//! ```

mod config;
mod error;
mod finding;
pub mod invocation;
pub mod resolver;
mod runner;
pub mod server;
pub mod timing;

pub use config::{CONFIG_FILES, CliSettings, ServerSettings, TransportKind, ValetConfig};
pub use error::{CheckError, ConfigError};
pub use finding::{Finding, FindingAction, FindingsByFile, Severity};
pub use invocation::{Invoke, ProcessInvoker, ProcessOutput};
pub use resolver::ExecutableResolver;
pub use runner::{CheckOutcome, CheckResult, CheckRunner};
pub use server::ServerClient;
