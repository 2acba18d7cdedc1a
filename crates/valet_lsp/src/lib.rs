//! Valet LSP Server
//!
//! Language Server Protocol implementation for Valet.
//! Runs Vale on open documents and publishes its findings as diagnostics,
//! keeping them attached to the text while it is edited.

mod config;
mod conversion;
mod debounce;
mod handler;
mod state;

use std::sync::Arc;
use std::time::Duration;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, error, info};

use valet_core::{CheckError, Invoke};

use crate::debounce::{is_current_version, spawn_debounced_validation};
use crate::state::{BackendState, SharedState};

/// The LSP backend for Valet.
#[derive(Clone)]
pub struct Backend {
    /// LSP client for sending notifications.
    client: Client,
    /// Shared state
    state: SharedState,
}

impl Backend {
    /// Creates a new backend with the given client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(BackendState::new()),
        }
    }

    /// Creates a backend that starts Vale through `invoker`.
    pub fn with_invoker(client: Client, invoker: Arc<dyn Invoke>) -> Self {
        Self {
            client,
            state: Arc::new(BackendState::with_invoker(invoker)),
        }
    }

    /// Checks a document and publishes diagnostics.
    ///
    /// The result is dropped if the document changed while Vale was running.
    /// Joining a check that was started for an older text does not count as
    /// checking this one, so the document is checked again.
    async fn validate_document(&self, uri: &Url) {
        debug!("Validating document: {}", uri);

        loop {
            let Some(snapshot) = handler::snapshot(&self.state, uri) else {
                debug!("Skipping validation for closed document: {}", uri);
                return;
            };

            let outcome = snapshot
                .runner
                .run_tracked(&snapshot.text, &snapshot.format)
                .await;

            if !outcome.ran_on(&snapshot.text) {
                if is_current_version(&self.state, uri, snapshot.version) {
                    debug!("Joined a check of older text for {}, checking again", uri);
                    continue;
                }
                debug!("Superseded while joined to an older check: {}", uri);
                return;
            }

            match outcome.result {
                Ok(findings) => {
                    let findings = findings.first_file_findings().to_vec();
                    if handler::install_findings(&self.state, uri, snapshot.version, findings) {
                        self.publish_diagnostics(uri).await;
                    }
                }
                Err(e) => self.report_check_error(&e).await,
            }
            return;
        }
    }

    /// Publishes the current decorations of a document.
    async fn publish_diagnostics(&self, uri: &Url) {
        if let Some((diagnostics, version)) = handler::current_diagnostics(&self.state, uri) {
            self.client
                .publish_diagnostics(uri.clone(), diagnostics, Some(version))
                .await;
        }
    }

    async fn report_check_error(&self, err: &CheckError) {
        error!("Check failed: {}", err);

        match check_error_report(err) {
            ErrorReport::Show(kind, message) => self.client.show_message(kind, message).await,
            ErrorReport::Log(kind, message) => self.client.log_message(kind, message).await,
        }
    }

    fn schedule_validation(&self, uri: Url, version: i32) {
        let delay = Duration::from_millis(self.state.config().debounce_delay);
        let backend = self.clone();

        spawn_debounced_validation(
            self.state.clone(),
            uri,
            version,
            delay,
            move |uri, _version| async move {
                backend.validate_document(&uri).await;
            },
        );
    }
}

/// Where a failed check is reported to the user.
#[derive(Debug, PartialEq, Eq)]
enum ErrorReport {
    /// A message window.
    Show(MessageType, String),
    /// The output log.
    Log(MessageType, String),
}

/// Configuration errors need the user's attention. Malformed output means
/// Vale broke its contract, which is told apart from a plain process failure.
fn check_error_report(err: &CheckError) -> ErrorReport {
    if err.is_configuration_error() {
        ErrorReport::Show(MessageType::ERROR, format!("Valet: {}", err))
    } else if err.is_parse_error() {
        ErrorReport::Show(
            MessageType::WARNING,
            format!("Valet: Vale returned malformed output ({})", err),
        )
    } else {
        ErrorReport::Log(MessageType::ERROR, format!("Valet: {}", err))
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        handler::handle_initialize(&self.state, &self.client, params).await
    }

    async fn initialized(&self, _: InitializedParams) {
        handler::handle_initialized(&self.client).await;
    }

    async fn shutdown(&self) -> Result<()> {
        handler::handle_shutdown().await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let (uri, _version) = handler::handle_did_open(&self.state, params).await;

        if self.state.config().auto_check {
            self.validate_document(&uri).await;
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let Some((uri, version)) = handler::handle_did_change(&self.state, params).await else {
            return;
        };

        self.publish_diagnostics(&uri).await;

        if self.state.config().auto_check {
            self.schedule_validation(uri, version);
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = handler::handle_did_save(params).await;
        self.validate_document(&uri).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        match handler::handle_did_change_watched_files(&self.state, params).await {
            Ok(true) => {
                self.client
                    .log_message(MessageType::INFO, "Valet configuration reloaded")
                    .await;
            }
            Ok(false) => {}
            Err(e) => {
                error!("Failed to load config: {}", e);
                self.client
                    .show_message(MessageType::ERROR, format!("Valet: {}", e))
                    .await;
            }
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = handler::handle_did_close(&self.state, params).await;

        // Clear diagnostics
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        Ok(handler::handle_hover(&self.state, params).await)
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        Ok(handler::handle_code_action(&self.state, params).await)
    }
}

/// Starts the LSP server.
///
/// This function does not return unless an error occurs or the server shuts down.
pub async fn run() {
    info!("Valet LSP server starting...");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
