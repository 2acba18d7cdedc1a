//! LSP command implementation

use miette::Result;
use tracing::info;

use crate::utils::create_tokio_runtime;

pub fn run_lsp() -> Result<()> {
    create_tokio_runtime()?.block_on(async {
        valet_lsp::run().await;
    });
    info!("LSP server stopped");
    Ok(())
}
