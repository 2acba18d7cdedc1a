//! LSP Backend state management.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tower_lsp::lsp_types::Url;
use tracing::error;

use valet_core::{CheckRunner, ExecutableResolver, Invoke, ProcessInvoker, ValetConfig};
use valet_document::{LintSession, SpellingCache};

/// Extension hint used when a document has none.
pub(crate) const DEFAULT_FORMAT: &str = ".md";

/// An open document and the version the client last reported.
#[derive(Debug)]
pub(crate) struct DocumentData {
    pub session: LintSession,
    pub version: i32,
}

/// Shared backend state.
pub(crate) struct BackendState {
    /// Open documents.
    pub documents: RwLock<HashMap<Url, DocumentData>>,
    /// Active configuration.
    pub config: RwLock<ValetConfig>,
    /// Resolver shared by every document's runner.
    pub resolver: RwLock<Arc<ExecutableResolver>>,
    /// Spawns Vale for CLI checks.
    pub invoker: Arc<dyn Invoke>,
    /// Spelling suggestions for the whole session.
    pub spelling: Arc<SpellingCache>,
    /// Workspace root path.
    pub workspace_root: RwLock<Option<PathBuf>>,
}

impl fmt::Debug for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendState")
            .field("documents", &"<HashMap<Url, DocumentData>>")
            .field("config", &self.config)
            .field("spelling", &self.spelling)
            .field("workspace_root", &self.workspace_root)
            .finish()
    }
}

impl BackendState {
    /// Creates a state that spawns the real Vale executable.
    pub fn new() -> Self {
        Self::with_invoker(Arc::new(ProcessInvoker))
    }

    /// Creates a state with a custom process invoker.
    pub fn with_invoker(invoker: Arc<dyn Invoke>) -> Self {
        let config = ValetConfig::new();
        let resolver = Arc::new(config.resolver());
        Self {
            documents: RwLock::new(HashMap::new()),
            config: RwLock::new(config),
            resolver: RwLock::new(resolver),
            invoker,
            spelling: Arc::new(SpellingCache::default()),
            workspace_root: RwLock::new(None),
        }
    }

    /// Snapshot of the active configuration.
    pub fn config(&self) -> ValetConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(e) => {
                error!("Config lock poisoned: {}", e);
                ValetConfig::new()
            }
        }
    }

    /// Builds a runner for a newly opened document.
    pub fn new_runner(&self) -> CheckRunner {
        let resolver = match self.resolver.read() {
            Ok(resolver) => Arc::clone(&resolver),
            Err(e) => {
                error!("Resolver lock poisoned: {}", e);
                Arc::new(ExecutableResolver::default())
            }
        };
        self.config().runner_with(resolver, Arc::clone(&self.invoker))
    }
}

impl Default for BackendState {
    fn default() -> Self {
        Self::new()
    }
}

/// Type alias for shared state.
pub type SharedState = Arc<BackendState>;

/// Extension hint for a document, e.g. `.md` for `notes.md`.
pub(crate) fn format_hint(uri: &Url) -> String {
    Path::new(uri.path())
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| DEFAULT_FORMAT.to_string())
}
