//! Vale executable and config file resolution.

use std::path::{Path, PathBuf};

use tokio::sync::OnceCell;
use tracing::debug;

/// Bare command name used when no installation is found.
pub const BINARY_NAME: &str = if cfg!(windows) { "vale.exe" } else { "vale" };

/// File name of Vale's own configuration.
pub const VALE_CONFIG_NAME: &str = ".vale.ini";

/// Well-known installation locations, probed in order.
///
/// 1. Homebrew on Apple Silicon
/// 2. Homebrew on Intel / manual installs
/// 3. System package managers
/// 4. `$HOME/.local/bin`
pub fn default_candidates() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = ["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"]
        .iter()
        .map(|dir| Path::new(dir).join(BINARY_NAME))
        .collect();

    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local").join("bin").join(BINARY_NAME));
    }

    candidates
}

/// Resolves a possibly relative path against a base directory.
pub fn resolve_relative(base_dir: Option<&Path>, path: &Path) -> PathBuf {
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolution {
    Found(PathBuf),
    Fallback,
}

/// Finds the Vale executable and its optional config file.
///
/// Probing happens at most once per resolver; build a new resolver to pick
/// up a changed installation.
#[derive(Debug)]
pub struct ExecutableResolver {
    explicit_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    candidates: Vec<PathBuf>,
    resolved: OnceCell<Resolution>,
}

impl ExecutableResolver {
    /// Creates a resolver. Empty paths count as unset.
    pub fn new(explicit_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Self {
        Self {
            explicit_path: explicit_path.filter(|p| !p.as_os_str().is_empty()),
            config_path: config_path.filter(|p| !p.as_os_str().is_empty()),
            candidates: default_candidates(),
            resolved: OnceCell::new(),
        }
    }

    /// Creates a resolver for a managed installation living in `data_dir`.
    pub fn managed(data_dir: &Path) -> Self {
        Self::new(
            Some(data_dir.join("bin").join(BINARY_NAME)),
            Some(data_dir.join(VALE_CONFIG_NAME)),
        )
    }

    /// Replaces the probed installation locations.
    pub fn with_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Returns the path to run.
    ///
    /// An explicit path is returned verbatim. Otherwise the first candidate
    /// that is a regular file wins; if none is, the bare command name is
    /// returned and left to the `PATH` search of the process spawner.
    pub async fn executable_path(&self) -> PathBuf {
        if let Some(path) = &self.explicit_path {
            return path.clone();
        }

        let resolution = self
            .resolved
            .get_or_init(|| async {
                match probe(&self.candidates).await {
                    Some(path) => {
                        debug!("Found vale at {}", path.display());
                        Resolution::Found(path)
                    }
                    None => {
                        debug!("Vale not found in common paths, falling back to PATH");
                        Resolution::Fallback
                    }
                }
            })
            .await;

        match resolution {
            Resolution::Found(path) => path.clone(),
            Resolution::Fallback => PathBuf::from(BINARY_NAME),
        }
    }

    /// Returns the explicitly configured Vale config path, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Returns true if the executable can be expected to run.
    ///
    /// A bare command name cannot be checked without searching `PATH`, so it
    /// is assumed present. A missing binary in that case only surfaces when
    /// the process fails to start.
    pub async fn executable_path_exists(&self) -> bool {
        let path = self.executable_path().await;
        if is_bare_command(&path) {
            return true;
        }
        is_file(&path).await
    }

    /// Returns true if an explicit config path was given and it is a file.
    pub async fn config_path_exists(&self) -> bool {
        match &self.config_path {
            Some(path) => is_file(path).await,
            None => false,
        }
    }
}

impl Default for ExecutableResolver {
    fn default() -> Self {
        Self::new(None, None)
    }
}

async fn probe(candidates: &[PathBuf]) -> Option<PathBuf> {
    for candidate in candidates {
        if is_file(candidate).await {
            return Some(candidate.clone());
        }
    }
    None
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

fn is_bare_command(path: &Path) -> bool {
    path.parent().is_none_or(|parent| parent.as_os_str().is_empty())
}
