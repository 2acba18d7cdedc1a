//! CLI utility functions

use std::path::Path;

use miette::{IntoDiagnostic, Result};
use tokio::runtime::Runtime;

/// Format hint used for files without an extension.
const DEFAULT_EXT: &str = ".md";

pub fn create_tokio_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()
}

/// The `--ext` value passed to Vale for `path`.
///
/// An explicit override wins; a missing leading dot is added.
pub fn format_hint(path: &Path, ext: Option<&str>) -> String {
    if let Some(ext) = ext {
        return if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{}", ext)
        };
    }

    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_else(|| DEFAULT_EXT.to_string())
}
