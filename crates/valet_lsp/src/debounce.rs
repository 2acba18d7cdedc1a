//! Debouncing utilities for LSP notifications.

use std::future::Future;
use std::time::Duration;

use tower_lsp::lsp_types::Url;
use tracing::{debug, error};

use crate::state::{BackendState, SharedState};

/// Spawns a debounced validation task.
///
/// Waits `delay`, then runs `validate_fn` only if the document is still open
/// at `version`. Any later edit supersedes this task.
pub fn spawn_debounced_validation<F, Fut>(
    state: SharedState,
    uri: Url,
    version: i32,
    delay: Duration,
    validate_fn: F,
) where
    F: FnOnce(Url, i32) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        if is_current_version(&state, &uri, version) {
            validate_fn(uri, version).await;
        } else {
            debug!("Skipping superseded check of {} (v{})", uri, version);
        }
    });
}

/// Checks if the document version is still current.
pub(crate) fn is_current_version(state: &BackendState, uri: &Url, version: i32) -> bool {
    let docs = match state.documents.read() {
        Ok(g) => g,
        Err(e) => {
            error!("Documents lock poisoned: {}", e);
            return false;
        }
    };

    docs.get(uri)
        .map(|doc| doc.version == version)
        .unwrap_or(false)
}
