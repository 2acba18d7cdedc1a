//! Watched files handler.

use tower_lsp::lsp_types::*;
use tracing::{debug, info};

use valet_core::{CONFIG_FILES, ConfigError};

use crate::config::reload_config;
use crate::state::BackendState;

/// Handles the `workspace/didChangeWatchedFiles` notification.
///
/// Returns `Ok(true)` when a config file changed and was reloaded.
pub async fn handle_did_change_watched_files(
    state: &BackendState,
    params: DidChangeWatchedFilesParams,
) -> Result<bool, ConfigError> {
    debug!("Watched files changed: {:?}", params.changes);

    if !touches_config(&params.changes) {
        return Ok(false);
    }

    info!("Configuration file changed, reloading...");
    reload_config(state)?;
    Ok(true)
}

fn touches_config(changes: &[FileEvent]) -> bool {
    changes.iter().any(|change| {
        let path = change.uri.path();
        CONFIG_FILES.iter().any(|name| path.ends_with(name))
    })
}
