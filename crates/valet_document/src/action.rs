//! Interpreting and applying a finding's fix action.

use tracing::debug;
use valet_core::{Finding, FindingAction};

use crate::position::map_to_offsets;
use crate::{ActionError, Change, ChangeSet, Document, LineTable};

/// Parameter telling Valet to fetch suggestions from a dictionary.
pub const SPELLINGS_SENTINEL: &str = "spellings";

/// What a fix action does to the flagged text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Delete the span.
    Remove,
    /// Replace the span with a suggestion.
    Replace,
    /// Replace the span with a suggestion, typically from a dictionary.
    Suggest,
    /// Anything else, lower-cased.
    Unknown(String),
}

impl Operation {
    /// Parses an operation name case-insensitively.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "remove" => Self::Remove,
            "replace" => Self::Replace,
            "suggest" => Self::Suggest,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// True for operations that insert a suggestion.
    pub fn takes_suggestion(&self) -> bool {
        matches!(self, Self::Replace | Self::Suggest)
    }
}

/// A fix action resolved into an operation and its candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedAction {
    pub operation: Operation,
    pub suggestions: Vec<String>,
    /// Suggestions must come from a dictionary keyed by the flagged word.
    pub needs_external_lookup: bool,
}

impl ClassifiedAction {
    /// Fills in looked-up suggestions.
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self.needs_external_lookup = false;
        self
    }
}

/// Classifies an action. `None` means there is nothing to apply.
///
/// - `edit`: the operation is `params[0]`, the rest are suggestions.
/// - `suggest` with the sole parameter `spellings`: suggestions must be
///   looked up.
/// - anything else: the action name is the operation, params are
///   suggestions.
pub fn classify(action: Option<&FindingAction>) -> Option<ClassifiedAction> {
    let action = action.filter(|a| !a.is_empty())?;
    let name = action.name.to_lowercase();

    match name.as_str() {
        "edit" => {
            let (operation, suggestions) = action.params.split_first()?;
            if operation.trim().is_empty() {
                return None;
            }
            Some(ClassifiedAction {
                operation: Operation::parse(operation),
                suggestions: suggestions.to_vec(),
                needs_external_lookup: false,
            })
        }
        "suggest" if action.params.len() == 1 && action.params[0] == SPELLINGS_SENTINEL => {
            Some(ClassifiedAction {
                operation: Operation::Suggest,
                suggestions: Vec::new(),
                needs_external_lookup: true,
            })
        }
        _ => Some(ClassifiedAction {
            operation: Operation::parse(&name),
            suggestions: action.params.clone(),
            needs_external_lookup: false,
        }),
    }
}

/// Computes the edit a fix would make, without touching the document.
///
/// The finding's position is recomputed against `table`; `index` picks the
/// suggestion and defaults to the first.
pub fn plan_edit(
    table: &impl LineTable,
    finding: &Finding,
    action: &ClassifiedAction,
    index: Option<usize>,
) -> Result<Change, ActionError> {
    let range = map_to_offsets(finding, table).ok_or(ActionError::StalePosition)?;

    match &action.operation {
        Operation::Remove => Ok(Change::delete(range.from, range.to)),
        Operation::Replace | Operation::Suggest => {
            if action.needs_external_lookup {
                return Err(ActionError::LookupRequired);
            }
            if action.suggestions.is_empty() {
                return Err(ActionError::NoSuggestions);
            }
            let index = index.unwrap_or(0);
            let suggestion =
                action
                    .suggestions
                    .get(index)
                    .ok_or(ActionError::SuggestionOutOfRange {
                        index,
                        len: action.suggestions.len(),
                    })?;
            Ok(Change::new(range.from, range.to, suggestion.clone()))
        }
        Operation::Unknown(name) => Err(ActionError::UnknownOperation(name.clone())),
    }
}

/// Applies a classified action as one transaction.
///
/// Returns the applied changes so decorations can be remapped.
pub fn try_apply_classified(
    document: &mut Document,
    finding: &Finding,
    action: &ClassifiedAction,
    index: Option<usize>,
) -> Result<ChangeSet, ActionError> {
    let change = plan_edit(&*document, finding, action, index)?;
    debug!(
        "Applying {:?} for {} at {}..{}",
        action.operation, finding.check, change.from, change.to
    );
    Ok(document.replace(change.from, change.to, change.insert)?)
}

/// Classifies the finding's own action and applies it.
pub fn try_apply(
    document: &mut Document,
    finding: &Finding,
    index: Option<usize>,
) -> Result<ChangeSet, ActionError> {
    let action = classify(finding.action.as_ref()).ok_or(ActionError::NoAction)?;
    try_apply_classified(document, finding, &action, index)
}

/// Applies the finding's action, reporting only success.
pub fn apply(document: &mut Document, finding: &Finding, index: Option<usize>) -> bool {
    match try_apply(document, finding, index) {
        Ok(_) => true,
        Err(e) => {
            debug!("Action for {} not applied: {}", finding.check, e);
            false
        }
    }
}
