//! Code action handler.

use std::collections::HashMap;

use tower_lsp::lsp_types::*;
use tracing::{debug, error};

use valet_document::{
    ActionMenu, Change, Decoration, Document, TextRange, plan_edit, resolve_action,
};

use crate::conversion::{offsets_to_range, positions_le, to_lsp_diagnostic};
use crate::state::BackendState;

/// A fix that still applies to the current text.
struct PlannedFix {
    label: String,
    change: Change,
}

/// Handles the `textDocument/codeAction` request.
pub async fn handle_code_action(
    state: &BackendState,
    params: CodeActionParams,
) -> Option<CodeActionResponse> {
    debug!("Code action request: {}", params.text_document.uri);

    let uri = &params.text_document.uri;
    let (document, decorations) = {
        let docs = match state.documents.read() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Documents lock poisoned: {}", e);
                return None;
            }
        };
        let session = &docs.get(uri)?.session;
        (
            session.document().clone(),
            session.decorations().iter().cloned().collect::<Vec<_>>(),
        )
    };

    // No `only` filter means every kind is wanted.
    let (wants_fix_all, wants_quickfix) = match &params.context.only {
        Some(only) => (
            only.contains(&CodeActionKind::SOURCE_FIX_ALL),
            only.contains(&CodeActionKind::QUICKFIX),
        ),
        None => (true, true),
    };

    let mut actions = Vec::new();
    let mut fix_all = Vec::new();

    for decoration in &decorations {
        let fixes = plan_fixes(state, decoration, &document).await;
        if fixes.is_empty() {
            continue;
        }

        if let Some(first) = fixes.first() {
            fix_all.push(first.change.clone());
        }

        let Some(range) = offsets_to_range(decoration.range, &document) else {
            continue;
        };
        if !wants_quickfix
            || !positions_le(range.start, params.range.end)
            || !positions_le(params.range.start, range.end)
        {
            continue;
        }

        let diagnostic = to_lsp_diagnostic(decoration, &document);
        let single = fixes.len() == 1;
        for fix in fixes {
            let Some(edit) = text_edit(&fix.change, &document) else {
                continue;
            };
            actions.push(CodeActionOrCommand::CodeAction(CodeAction {
                title: fix.label,
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: diagnostic.clone().map(|d| vec![d]),
                edit: Some(workspace_edit(uri, vec![edit])),
                is_preferred: Some(single),
                ..Default::default()
            }));
        }
    }

    if wants_fix_all {
        let edits: Vec<TextEdit> = non_overlapping(fix_all)
            .iter()
            .filter_map(|change| text_edit(change, &document))
            .collect();

        if !edits.is_empty() {
            actions.push(CodeActionOrCommand::CodeAction(CodeAction {
                title: "Fix all Vale issues".to_string(),
                kind: Some(CodeActionKind::SOURCE_FIX_ALL),
                edit: Some(workspace_edit(uri, edits)),
                ..Default::default()
            }));
        }
    }

    Some(actions)
}

/// One fix per menu item of the decoration's finding.
///
/// A finding whose recomputed position no longer matches its decoration is
/// stale until the next check and offers nothing.
async fn plan_fixes(
    state: &BackendState,
    decoration: &Decoration,
    document: &Document,
) -> Vec<PlannedFix> {
    let finding = &decoration.finding;
    let Some(action) = resolve_action(finding, &state.spelling).await else {
        return Vec::new();
    };
    let menu = ActionMenu::new(decoration.id, finding, Some(&action));

    menu.items
        .into_iter()
        .filter_map(|item| {
            match plan_edit(document, finding, &action, item.suggestion_index) {
                Ok(change) if TextRange::new(change.from, change.to) == decoration.range => {
                    Some(PlannedFix {
                        label: item.label,
                        change,
                    })
                }
                Ok(_) => {
                    debug!("Skipping stale fix for {}", finding.check);
                    None
                }
                Err(e) => {
                    debug!("No fix for {}: {}", finding.check, e);
                    None
                }
            }
        })
        .collect()
}

/// Keeps the earliest of any overlapping changes.
fn non_overlapping(mut changes: Vec<Change>) -> Vec<Change> {
    changes.sort_by_key(|c| (c.from, c.to));

    let mut kept: Vec<Change> = Vec::with_capacity(changes.len());
    for change in changes {
        if kept.last().is_some_and(|last| change.from < last.to) {
            continue;
        }
        kept.push(change);
    }
    kept
}

fn text_edit(change: &Change, document: &Document) -> Option<TextEdit> {
    let range = offsets_to_range(TextRange::new(change.from, change.to), document)?;
    Some(TextEdit {
        range,
        new_text: change.insert.clone(),
    })
}

fn workspace_edit(uri: &Url, edits: Vec<TextEdit>) -> WorkspaceEdit {
    WorkspaceEdit {
        changes: Some(HashMap::from([(uri.clone(), edits)])),
        ..Default::default()
    }
}
