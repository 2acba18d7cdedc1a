//! Valet configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use jsonc_parser::ParseOptions;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::invocation::{Invoke, ProcessInvoker};
use crate::resolver::{ExecutableResolver, resolve_relative};
use crate::runner::CheckRunner;
use crate::server::{DEFAULT_SERVER_URL, ServerClient};
use crate::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Config file names, in discovery order.
pub const CONFIG_FILES: &[&str] = &[".valet.jsonc", ".valet.json"];

/// How checks reach Vale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Spawn the Vale CLI for every check.
    #[default]
    Cli,
    /// Post checks to a running Vale server.
    Server,
}

/// Settings for the server transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    #[serde(default = "default_server_url")]
    pub url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_server_url(),
        }
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

/// Settings for the CLI transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliSettings {
    /// Explicit executable path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vale_path: Option<PathBuf>,

    /// Explicit `.vale.ini` path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,

    /// Use the installation in Valet's data directory.
    #[serde(default)]
    pub managed: bool,
}

/// Configuration for Valet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValetConfig {
    /// Transport used for checks.
    #[serde(default, rename = "type")]
    pub transport: TransportKind,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub cli: CliSettings,

    /// Milliseconds between the last edit and an automatic re-check.
    #[serde(default = "default_debounce_delay")]
    pub debounce_delay: u64,

    /// Re-check documents when they change.
    #[serde(default = "default_true")]
    pub auto_check: bool,

    /// Publish findings inline.
    #[serde(default = "default_true")]
    pub inline_decorations: bool,

    /// Base directory for resolving relative paths.
    /// This is usually the directory containing the configuration file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_debounce_delay() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

impl ValetConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self {
            transport: TransportKind::Cli,
            server: ServerSettings::default(),
            cli: CliSettings::default(),
            debounce_delay: default_debounce_delay(),
            auto_check: true,
            inline_decorations: true,
            base_dir: None,
        }
    }

    /// Loads configuration from a file.
    ///
    /// Supports `.valet.jsonc` and `.valet.json`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read(e.to_string()))?;

        let mut config = Self::from_json(&content)?;
        if let Some(parent) = path.parent() {
            config.base_dir = Some(parent.to_path_buf());
        }

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses configuration from JSON (comments allowed) with schema validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value = jsonc_parser::parse_to_serde_value(json, &ParseOptions::default())
            .map_err(|e| ConfigError::syntax(e.to_string()))?
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

        if let Err(e) = schema()?.validate(&value) {
            return Err(ConfigError::Validation(format!(
                "{} at {}",
                e,
                e.instance_path()
            )));
        }

        serde_json::from_value(value).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Returns the first config file present in `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let dir = dir.as_ref();
        CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Directory holding the managed Vale installation.
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("valet"))
    }

    /// Builds the executable resolver implied by this configuration.
    pub fn resolver(&self) -> ExecutableResolver {
        if self.cli.managed
            && let Some(data_dir) = Self::data_dir()
        {
            return ExecutableResolver::managed(&data_dir);
        }

        let base = self.base_dir.as_deref();
        let resolve = |path: &Option<PathBuf>| {
            path.as_deref()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| resolve_relative(base, p))
        };

        ExecutableResolver::new(resolve(&self.cli.vale_path), resolve(&self.cli.config_path))
    }

    /// Builds a check runner for the configured transport.
    pub fn runner(&self) -> CheckRunner {
        self.runner_with(Arc::new(self.resolver()), Arc::new(ProcessInvoker))
    }

    /// Builds a check runner sharing an existing resolver and invoker.
    ///
    /// Both are ignored by the server transport.
    pub fn runner_with(
        &self,
        resolver: Arc<ExecutableResolver>,
        invoker: Arc<dyn Invoke>,
    ) -> CheckRunner {
        match self.transport {
            TransportKind::Cli => CheckRunner::with_invoker(resolver, invoker),
            TransportKind::Server => CheckRunner::server(ServerClient::new(&self.server.url)),
        }
    }
}

impl Default for ValetConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn schema() -> Result<&'static Validator, ConfigError> {
    if let Some(validator) = CONFIG_SCHEMA.get() {
        return Ok(validator);
    }

    let schema_json: serde_json::Value = serde_json::from_str(SCHEMA_JSON)
        .map_err(|e| ConfigError::Invalid(format!("embedded schema: {}", e)))?;
    let validator = Validator::new(&schema_json)
        .map_err(|e| ConfigError::Invalid(format!("embedded schema: {}", e)))?;

    Ok(CONFIG_SCHEMA.get_or_init(|| validator))
}
