//! Document lifecycle handlers (open, change, save, close).

use std::sync::Arc;

use tower_lsp::lsp_types::*;
use tracing::{debug, error};

use valet_core::{CheckRunner, Finding};
use valet_document::{Change, ChangeSet, EditError, LintSession};

use crate::conversion::{range_to_offsets, to_lsp_diagnostic};
use crate::state::{BackendState, DocumentData, format_hint};

/// Handles the `textDocument/didOpen` notification.
///
/// Returns the URI and version to check.
pub async fn handle_did_open(
    state: &BackendState,
    params: DidOpenTextDocumentParams,
) -> (Url, i32) {
    debug!("Document opened: {}", params.text_document.uri);

    let uri = params.text_document.uri;
    let version = params.text_document.version;
    let session = LintSession::new(
        params.text_document.text,
        format_hint(&uri),
        state.new_runner(),
        Arc::clone(&state.spelling),
    );

    match state.documents.write() {
        Ok(mut docs) => {
            docs.insert(uri.clone(), DocumentData { session, version });
        }
        Err(e) => error!("Documents lock poisoned: {}", e),
    }

    (uri, version)
}

/// Handles the `textDocument/didChange` notification.
///
/// Edits are applied in order and every decoration is remapped through them.
/// Returns the URI and new version for debounced validation.
pub async fn handle_did_change(
    state: &BackendState,
    params: DidChangeTextDocumentParams,
) -> Option<(Url, i32)> {
    debug!("Document changed: {}", params.text_document.uri);

    let uri = params.text_document.uri;
    let version = params.text_document.version;

    let mut docs = match state.documents.write() {
        Ok(guard) => guard,
        Err(e) => {
            error!("Documents lock poisoned: {}", e);
            return None;
        }
    };

    let Some(data) = docs.get_mut(&uri) else {
        debug!("Change for unknown document: {}", uri);
        return None;
    };

    for change in params.content_changes {
        if let Err(e) = apply_content_change(&mut data.session, change) {
            error!("Failed to apply change to {}: {}", uri, e);
        }
    }
    data.version = version;

    Some((uri, version))
}

fn apply_content_change(
    session: &mut LintSession,
    change: TextDocumentContentChangeEvent,
) -> Result<(), EditError> {
    match change.range {
        Some(range) => {
            let (from, to) = range_to_offsets(range, session.document());
            let changes = ChangeSet::single(Change::new(from, to, change.text))?;
            session.on_document_changed(changes)
        }
        None => session.set_text(change.text),
    }
}

/// Handles the `textDocument/didSave` notification.
pub async fn handle_did_save(params: DidSaveTextDocumentParams) -> Url {
    debug!("Document saved: {}", params.text_document.uri);
    params.text_document.uri
}

/// Handles the `textDocument/didClose` notification.
pub async fn handle_did_close(state: &BackendState, params: DidCloseTextDocumentParams) -> Url {
    debug!("Document closed: {}", params.text_document.uri);

    match state.documents.write() {
        Ok(mut docs) => {
            docs.remove(&params.text_document.uri);
        }
        Err(e) => error!("Documents lock poisoned: {}", e),
    }

    params.text_document.uri
}

/// What a check needs, captured without holding the lock across it.
pub struct CheckSnapshot {
    pub text: String,
    pub format: String,
    pub runner: CheckRunner,
    pub version: i32,
}

/// Captures the current text of an open document.
pub fn snapshot(state: &BackendState, uri: &Url) -> Option<CheckSnapshot> {
    let docs = match state.documents.read() {
        Ok(guard) => guard,
        Err(e) => {
            error!("Documents lock poisoned: {}", e);
            return None;
        }
    };

    docs.get(uri).map(|data| CheckSnapshot {
        text: data.session.document().text().to_string(),
        format: data.session.format().to_string(),
        runner: data.session.runner().clone(),
        version: data.version,
    })
}

/// Installs a check result if the document is still at `version`.
///
/// Returns `false` when the result was checked against a text that has
/// since changed.
pub fn install_findings(
    state: &BackendState,
    uri: &Url,
    version: i32,
    findings: Vec<Finding>,
) -> bool {
    let mut docs = match state.documents.write() {
        Ok(guard) => guard,
        Err(e) => {
            error!("Documents lock poisoned: {}", e);
            return false;
        }
    };

    match docs.get_mut(uri) {
        Some(data) if data.version == version => {
            data.session.install_findings(findings);
            true
        }
        Some(data) => {
            debug!(
                "Discarding findings for {}: checked v{}, now v{}",
                uri, version, data.version
            );
            false
        }
        None => false,
    }
}

/// Diagnostics for the current decorations, with the document version.
///
/// Empty when inline decorations are disabled.
pub fn current_diagnostics(state: &BackendState, uri: &Url) -> Option<(Vec<Diagnostic>, i32)> {
    let inline = state.config().inline_decorations;

    let docs = match state.documents.read() {
        Ok(guard) => guard,
        Err(e) => {
            error!("Documents lock poisoned: {}", e);
            return None;
        }
    };

    let data = docs.get(uri)?;
    if !inline {
        return Some((Vec::new(), data.version));
    }

    let document = data.session.document();
    let diagnostics = data
        .session
        .decorations()
        .iter()
        .filter_map(|decoration| to_lsp_diagnostic(decoration, document))
        .collect();
    Some((diagnostics, data.version))
}
