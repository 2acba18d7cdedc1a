//! LSP request/notification handlers.

mod code_action;
mod documents;
mod files;
mod hover;
mod initialize;

pub use code_action::handle_code_action;
pub use documents::{
    current_diagnostics, handle_did_change, handle_did_close, handle_did_open, handle_did_save,
    install_findings, snapshot,
};
pub use files::handle_did_change_watched_files;
pub use hover::handle_hover;
pub use initialize::{handle_initialize, handle_initialized, handle_shutdown};
