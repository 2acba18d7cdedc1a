//! Hover lookup and the action menu shown for a finding.

use valet_core::{Finding, Severity};

use crate::action::{ClassifiedAction, Operation};
use crate::decoration::{DecorationSet, FindingRef};

/// Finds the decoration under `offset`.
///
/// A decoration covering `offset` wins over one that merely ends there, so a
/// cursor right after a word still finds it unless the next one starts at the
/// same place. Among overlapping decorations the one that starts first wins.
pub fn query_hover(decorations: &DecorationSet, offset: usize) -> Option<FindingRef> {
    decorations
        .iter()
        .find(|d| d.range.contains(offset))
        .or_else(|| decorations.iter().find(|d| d.range.touches(offset)))
        .map(|d| d.id)
}

/// One applicable fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    /// Suggestion to apply; `None` for removals.
    pub suggestion_index: Option<usize>,
}

/// Everything a hover surface needs to render a finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMenu {
    pub id: FindingRef,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub description: String,
    pub check: String,
    pub link: Option<String>,
    pub items: Vec<MenuItem>,
}

impl ActionMenu {
    /// Builds the menu for a finding.
    ///
    /// `action` must already carry looked-up suggestions; an unresolved
    /// lookup yields no items.
    pub fn new(id: FindingRef, finding: &Finding, action: Option<&ClassifiedAction>) -> Self {
        let items = match action {
            Some(action) if !action.needs_external_lookup => items_for(action),
            _ => Vec::new(),
        };

        Self {
            id,
            severity: finding.severity_level(),
            title: format!(
                "{}: {} ({})",
                finding.severity, finding.message, finding.check
            ),
            message: finding.message.clone(),
            description: finding.description.clone(),
            check: finding.check.clone(),
            link: Some(finding.link.clone()).filter(|link| !link.is_empty()),
            items,
        }
    }
}

fn items_for(action: &ClassifiedAction) -> Vec<MenuItem> {
    match &action.operation {
        Operation::Remove => vec![MenuItem {
            label: "Remove".to_string(),
            suggestion_index: None,
        }],
        Operation::Replace | Operation::Suggest => action
            .suggestions
            .iter()
            .enumerate()
            .map(|(index, suggestion)| MenuItem {
                label: format!("Replace with '{}'", suggestion),
                suggestion_index: Some(index),
            })
            .collect(),
        Operation::Unknown(_) => Vec::new(),
    }
}
