//! Error types for checks and configuration.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can end a check.
///
/// Every variant is cheap to clone so that all callers joined on the same
/// in-flight check observe the same failure.
#[derive(Debug, Clone, Error)]
pub enum CheckError {
    /// The resolved Vale executable does not exist.
    #[error("Couldn't find vale at: {}", .path.display())]
    MissingExecutable { path: PathBuf },

    /// An explicitly configured Vale config file does not exist.
    #[error("Couldn't find config file at: {}", .path.display())]
    MissingConfig { path: PathBuf },

    /// The process could not be started.
    #[error("Failed to start {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    /// Reading from or writing to the process failed.
    #[error("I/O error: {0}")]
    Io(#[source] Arc<io::Error>),

    /// The process exited with a code other than 0 or 1.
    #[error("Vale exited unexpectedly ({}): {stderr}", describe_exit(.code))]
    ProcessFailed { code: Option<i32>, stderr: String },

    /// The engine reported findings but the payload was not valid JSON.
    #[error("Failed to parse Vale output: {0}")]
    Parse(#[source] Arc<serde_json::Error>),

    /// The server transport failed before a response arrived.
    #[error("Server request failed: {0}")]
    Server(#[source] Arc<reqwest::Error>),

    /// The server answered with a non-success status.
    #[error("Server responded with status {status}: {body}")]
    ServerStatus { status: u16, body: String },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl CheckError {
    /// Missing executable or config file. Never retried.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingExecutable { .. } | Self::MissingConfig { .. }
        )
    }

    /// Failure to run the engine or talk to it.
    pub fn is_process_error(&self) -> bool {
        matches!(
            self,
            Self::Spawn { .. }
                | Self::Io(_)
                | Self::ProcessFailed { .. }
                | Self::Server(_)
                | Self::ServerStatus { .. }
        )
    }

    /// The engine broke its output contract.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

impl From<io::Error> for CheckError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for CheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(Arc::new(err))
    }
}

impl From<reqwest::Error> for CheckError {
    fn from(err: reqwest::Error) -> Self {
        Self::Server(Arc::new(err))
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config: {0}")]
    Read(String),

    /// The file is not valid JSON/JSONC.
    #[error("Invalid JSON: {0}")]
    Syntax(String),

    /// The document does not match the schema.
    #[error("Config validation failed: {0}")]
    Validation(String),

    /// The document matched the schema but could not be deserialized.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Creates a read error.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read(message.into())
    }

    /// Creates a syntax error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax(message.into())
    }
}
