//! Configuration management for LSP server.

use std::sync::Arc;

use tracing::{error, info};

use valet_core::{ConfigError, ValetConfig};

use crate::state::BackendState;

/// Reloads configuration from the workspace root.
///
/// Without a config file the defaults apply. On success the resolver is
/// rebuilt and every open document gets a fresh runner; on failure the
/// previous configuration stays active.
pub fn reload_config(state: &BackendState) -> Result<(), ConfigError> {
    let root = match state.workspace_root.read() {
        Ok(g) => g.clone(),
        Err(e) => {
            error!("Workspace root lock poisoned: {}", e);
            return Ok(());
        }
    };

    let Some(root) = root else {
        return Ok(());
    };

    let config = match ValetConfig::discover(&root) {
        Some(config_path) => {
            info!("Found config file: {}", config_path.display());
            let config = ValetConfig::from_file(&config_path)?;
            info!("Loaded configuration from workspace");
            config
        }
        None => {
            info!("No config file in {}, using defaults", root.display());
            ValetConfig::new()
        }
    };

    apply_config(state, config);
    Ok(())
}

/// Installs `config` and rebuilds every runner from it.
pub(crate) fn apply_config(state: &BackendState, config: ValetConfig) {
    let resolver = Arc::new(config.resolver());

    match state.resolver.write() {
        Ok(mut guard) => *guard = Arc::clone(&resolver),
        Err(e) => {
            error!("Resolver lock poisoned: {}", e);
            return;
        }
    }

    match state.config.write() {
        Ok(mut guard) => *guard = config.clone(),
        Err(e) => {
            error!("Config lock poisoned: {}", e);
            return;
        }
    }

    match state.documents.write() {
        Ok(mut docs) => {
            for data in docs.values_mut() {
                let runner = config.runner_with(Arc::clone(&resolver), Arc::clone(&state.invoker));
                data.session.set_runner(runner);
            }
            info!("Rebuilt runners for {} open document(s)", docs.len());
        }
        Err(e) => error!("Documents lock poisoned: {}", e),
    }
}
