//! Hover handler.

use std::fmt::Write;
use std::sync::Arc;

use tower_lsp::lsp_types::*;
use tracing::{debug, error};

use valet_core::Finding;
use valet_document::{ActionMenu, FindingRef, resolve_action};

use crate::conversion::{offsets_to_range, position_to_offset};
use crate::state::BackendState;

/// Handles the `textDocument/hover` request.
pub async fn handle_hover(state: &BackendState, params: HoverParams) -> Option<Hover> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;
    debug!("Hover request: {} {:?}", uri, position);

    let (id, finding, range, document) = {
        let docs = match state.documents.read() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Documents lock poisoned: {}", e);
                return None;
            }
        };
        let session = &docs.get(uri)?.session;
        let offset = position_to_offset(position, session.document());
        let id = session.query_hover(offset)?;
        let decoration = session.decorations().get(id)?;
        (
            id,
            Arc::clone(&decoration.finding),
            decoration.range,
            session.document().clone(),
        )
    };

    let menu = build_menu(state, id, &finding).await;
    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: render_menu(&menu),
        }),
        range: offsets_to_range(range, &document),
    })
}

async fn build_menu(state: &BackendState, id: FindingRef, finding: &Finding) -> ActionMenu {
    let action = resolve_action(finding, &state.spelling).await;
    ActionMenu::new(id, finding, action.as_ref())
}

/// Renders the action menu as Markdown.
pub fn render_menu(menu: &ActionMenu) -> String {
    let mut out = format!("**{}**", menu.title);

    if !menu.description.is_empty() {
        let _ = write!(out, "\n\n{}", menu.description);
    }
    if let Some(link) = &menu.link {
        let _ = write!(out, "\n\n[{}]({})", menu.check, link);
    }
    if !menu.items.is_empty() {
        out.push_str("\n\n");
        for item in &menu.items {
            let _ = writeln!(out, "- {}", item.label);
        }
        out.truncate(out.trim_end().len());
    }

    out
}
