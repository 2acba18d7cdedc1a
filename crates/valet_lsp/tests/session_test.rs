mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tower_lsp::lsp_types::*;
use tower_lsp::{LanguageServer, LspService};
use valet_lsp::Backend;

use common::{FakeVale, TEXT, flag_teh, recv_msg, send_msg, workspace};

const CONFIG: &str = r#"{ "cli": { "valePath": "vale-bin" }, "debounceDelay": 60000 }"#;

fn doc_uri(root: &std::path::Path) -> Url {
    Url::from_file_path(root.join("notes.md")).unwrap()
}

async fn start(root: &std::path::Path, fake: Arc<FakeVale>) -> LspService<Backend> {
    let (service, _) = LspService::new(move |client| Backend::with_invoker(client, fake));

    service
        .inner()
        .initialize(InitializeParams {
            root_uri: Some(Url::from_file_path(root).unwrap()),
            ..Default::default()
        })
        .await
        .unwrap();
    service.inner().initialized(InitializedParams {}).await;

    service
        .inner()
        .did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: doc_uri(root),
                language_id: "markdown".to_string(),
                version: 1,
                text: TEXT.to_string(),
            },
        })
        .await;

    service
}

async fn hover(service: &LspService<Backend>, uri: &Url, position: Position) -> Option<Hover> {
    service
        .inner()
        .hover(HoverParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri: uri.clone() },
                position,
            },
            work_done_progress_params: Default::default(),
        })
        .await
        .unwrap()
}

async fn code_actions(
    service: &LspService<Backend>,
    uri: &Url,
    range: Range,
) -> Vec<CodeAction> {
    service
        .inner()
        .code_action(CodeActionParams {
            text_document: TextDocumentIdentifier { uri: uri.clone() },
            range,
            context: CodeActionContext::default(),
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        })
        .await
        .unwrap()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|action| match action {
            CodeActionOrCommand::CodeAction(action) => Some(action),
            CodeActionOrCommand::Command(_) => None,
        })
        .collect()
}

fn markdown(hover: &Hover) -> &str {
    match &hover.contents {
        HoverContents::Markup(content) => &content.value,
        other => panic!("unexpected hover contents: {:?}", other),
    }
}

fn edits(action: &CodeAction, uri: &Url) -> Vec<TextEdit> {
    action
        .edit
        .as_ref()
        .and_then(|edit| edit.changes.as_ref())
        .and_then(|changes| changes.get(uri))
        .cloned()
        .unwrap_or_default()
}

fn range(start: (u32, u32), end: (u32, u32)) -> Range {
    Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1))
}

#[tokio::test]
async fn test_open_runs_one_check() {
    let dir = workspace(CONFIG);
    let fake = FakeVale::with_findings();
    let _service = start(dir.path(), fake.clone()).await;

    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn test_open_without_auto_check() {
    let dir = workspace(r#"{ "cli": { "valePath": "vale-bin" }, "autoCheck": false }"#);
    let fake = FakeVale::with_findings();
    let service = start(dir.path(), fake.clone()).await;

    assert_eq!(fake.calls(), 0);
    assert!(hover(&service, &doc_uri(dir.path()), Position::new(0, 5)).await.is_none());
}

#[tokio::test]
async fn test_hover_shows_finding() {
    let dir = workspace(CONFIG);
    let service = start(dir.path(), FakeVale::with_findings()).await;
    let uri = doc_uri(dir.path());

    let hover = hover(&service, &uri, Position::new(0, 5)).await.unwrap();
    let text = markdown(&hover);

    assert!(text.contains("error: Use 'Vale' instead of 'vale'. (Vale.Terms)"));
    assert!(text.contains("[Vale.Terms](https://vale.sh/docs)"));
    assert!(text.contains("- Replace with 'Vale'"));
    assert_eq!(hover.range, Some(range((0, 4), (0, 8))));
}

#[tokio::test]
async fn test_hover_outside_findings() {
    let dir = workspace(CONFIG);
    let service = start(dir.path(), FakeVale::with_findings()).await;

    let hover = hover(&service, &doc_uri(dir.path()), Position::new(0, 17)).await;
    assert!(hover.is_none());
}

#[tokio::test]
async fn test_code_actions_for_finding() {
    let dir = workspace(CONFIG);
    let service = start(dir.path(), FakeVale::with_findings()).await;
    let uri = doc_uri(dir.path());

    let actions = code_actions(&service, &uri, range((0, 5), (0, 5))).await;

    let quickfix = actions
        .iter()
        .find(|a| a.kind == Some(CodeActionKind::QUICKFIX))
        .unwrap();
    assert_eq!(quickfix.title, "Replace with 'Vale'");
    assert_eq!(
        edits(quickfix, &uri),
        vec![TextEdit {
            range: range((0, 4), (0, 8)),
            new_text: "Vale".to_string(),
        }]
    );

    let fix_all = actions
        .iter()
        .find(|a| a.kind == Some(CodeActionKind::SOURCE_FIX_ALL))
        .unwrap();
    assert_eq!(
        edits(fix_all, &uri),
        vec![
            TextEdit {
                range: range((0, 4), (0, 8)),
                new_text: "Vale".to_string(),
            },
            TextEdit {
                range: range((0, 9), (0, 13)),
                new_text: String::new(),
            },
        ]
    );
}

#[tokio::test]
async fn test_spelling_without_suggestions_offers_nothing() {
    let dir = workspace(CONFIG);
    let service = start(dir.path(), FakeVale::with_findings()).await;
    let uri = doc_uri(dir.path());

    let actions = code_actions(&service, &uri, range((1, 1), (1, 1))).await;
    assert!(
        actions
            .iter()
            .all(|a| a.kind != Some(CodeActionKind::QUICKFIX))
    );

    let hover = hover(&service, &uri, Position::new(1, 1)).await.unwrap();
    assert!(markdown(&hover).contains("Vale.Spelling"));
    assert!(!markdown(&hover).contains("Replace with"));
}

#[tokio::test]
async fn test_edit_remaps_findings() {
    let dir = workspace(CONFIG);
    let service = start(dir.path(), FakeVale::with_findings()).await;
    let uri = doc_uri(dir.path());

    service
        .inner()
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier {
                uri: uri.clone(),
                version: 2,
            },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: Some(range((0, 0), (0, 0))),
                range_length: None,
                text: "We ".to_string(),
            }],
        })
        .await;

    let hover = hover(&service, &uri, Position::new(0, 8)).await.unwrap();
    assert!(markdown(&hover).contains("Vale.Terms"));
    assert_eq!(hover.range, Some(range((0, 7), (0, 11))));

    // Line/span no longer match the text until the next check.
    let actions = code_actions(&service, &uri, range((0, 8), (0, 8))).await;
    assert!(actions.is_empty());
}

#[tokio::test]
async fn test_edit_inside_finding_drops_it() {
    let dir = workspace(CONFIG);
    let service = start(dir.path(), FakeVale::with_findings()).await;
    let uri = doc_uri(dir.path());

    service
        .inner()
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier {
                uri: uri.clone(),
                version: 2,
            },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: Some(range((0, 4), (0, 8))),
                range_length: None,
                text: String::new(),
            }],
        })
        .await;

    // "Use  very much." with "very" shifted to 5..9
    let hover = hover(&service, &uri, Position::new(0, 5)).await.unwrap();
    assert!(markdown(&hover).contains("Vale.Redundancy"));
    assert!(!markdown(&hover).contains("Vale.Terms"));
    assert_eq!(hover.range, Some(range((0, 5), (0, 9))));
}

#[tokio::test]
async fn test_save_during_older_check_checks_new_text() {
    let dir = workspace(CONFIG);
    let fake = FakeVale::scripted(Duration::from_millis(150), flag_teh);
    let fake_for_backend = fake.clone();
    let (service, _) =
        LspService::new(move |client| Backend::with_invoker(client, fake_for_backend));
    let uri = doc_uri(dir.path());

    service
        .inner()
        .initialize(InitializeParams {
            root_uri: Some(Url::from_file_path(dir.path()).unwrap()),
            ..Default::default()
        })
        .await
        .unwrap();

    let opener = service.inner().clone();
    let open_params = DidOpenTextDocumentParams {
        text_document: TextDocumentItem {
            uri: uri.clone(),
            language_id: "markdown".to_string(),
            version: 1,
            text: "teh cat".to_string(),
        },
    };
    let opened = tokio::spawn(async move { opener.did_open(open_params).await });
    tokio::time::sleep(Duration::from_millis(30)).await;

    service
        .inner()
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier {
                uri: uri.clone(),
                version: 2,
            },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "Oh, teh cat".to_string(),
            }],
        })
        .await;
    service
        .inner()
        .did_save(DidSaveTextDocumentParams {
            text_document: TextDocumentIdentifier { uri: uri.clone() },
            text: None,
        })
        .await;
    opened.await.unwrap();

    // The save joined the check of "teh cat", then checked "Oh, teh cat".
    assert_eq!(fake.calls(), 2);
    assert!(hover(&service, &uri, Position::new(0, 1)).await.is_none());
    let hover = hover(&service, &uri, Position::new(0, 5)).await.unwrap();
    assert!(markdown(&hover).contains("Vale.Spelling"));
    assert_eq!(hover.range, Some(range((0, 4), (0, 7))));
}

#[tokio::test]
async fn test_close_forgets_document() {
    let dir = workspace(CONFIG);
    let service = start(dir.path(), FakeVale::with_findings()).await;
    let uri = doc_uri(dir.path());

    service
        .inner()
        .did_close(DidCloseTextDocumentParams {
            text_document: TextDocumentIdentifier { uri: uri.clone() },
        })
        .await;

    assert!(hover(&service, &uri, Position::new(0, 5)).await.is_none());
    assert!(code_actions(&service, &uri, range((0, 5), (0, 5))).await.is_empty());
}

#[tokio::test]
async fn test_rapid_changes_are_debounced() {
    let dir = workspace(r#"{ "cli": { "valePath": "vale-bin" }, "debounceDelay": 300 }"#);
    let fake = FakeVale::with_findings();
    let service = start(dir.path(), fake.clone()).await;
    let uri = doc_uri(dir.path());

    for version in 2..=6 {
        service
            .inner()
            .did_change(DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier {
                    uri: uri.clone(),
                    version,
                },
                content_changes: vec![TextDocumentContentChangeEvent {
                    range: None,
                    range_length: None,
                    text: format!("Change {}", version),
                }],
            })
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    tokio::time::sleep(Duration::from_millis(700)).await;

    // One check on open, one for the last change.
    assert_eq!(fake.calls(), 2);
}

#[tokio::test]
async fn test_publishes_diagnostics_over_protocol() {
    let dir = workspace(CONFIG);
    let fake = FakeVale::with_findings();

    let (client_read, server_write) = tokio::io::duplex(4096);
    let (server_read, client_write) = tokio::io::duplex(4096);

    let (service, socket) = LspService::new(move |client| Backend::with_invoker(client, fake));
    tokio::spawn(async move {
        tower_lsp::Server::new(server_read, server_write, socket)
            .serve(service)
            .await;
    });

    let mut reader = tokio::io::BufReader::new(client_read);
    let mut writer = client_write;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(msg) = recv_msg(&mut reader).await {
            if tx.send(msg).is_err() {
                break;
            }
        }
    });

    let root_uri = Url::from_file_path(dir.path()).unwrap();
    let init = format!(
        r#"{{"jsonrpc":"2.0","id":1,"method":"initialize","params":{{"rootUri":"{}","capabilities":{{}}}}}}"#,
        root_uri
    );
    send_msg(&mut writer, &init).await;
    let response = rx.recv().await.unwrap();
    assert!(response.contains("valet-lsp"));
    assert!(response.contains("hoverProvider"));

    send_msg(
        &mut writer,
        r#"{"jsonrpc":"2.0","method":"initialized","params":{}}"#,
    )
    .await;

    let did_open = serde_json::json!({
        "jsonrpc": "2.0",
        "method": "textDocument/didOpen",
        "params": {
            "textDocument": {
                "uri": doc_uri(dir.path()),
                "languageId": "markdown",
                "version": 1,
                "text": TEXT,
            }
        }
    });
    send_msg(&mut writer, &did_open.to_string()).await;

    let published = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(msg) = rx.recv().await {
            if msg.contains("textDocument/publishDiagnostics") {
                return Some(msg);
            }
        }
        None
    })
    .await
    .unwrap()
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&published).unwrap();
    let diagnostics = value["params"]["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 3);
    assert_eq!(diagnostics[0]["code"], "Vale.Terms");
    assert_eq!(diagnostics[0]["source"], "vale");
    assert_eq!(diagnostics[0]["severity"], 1);
    assert_eq!(diagnostics[1]["severity"], 2);
}
