//! Error types for edits, fix actions and dictionary lookups.

use thiserror::Error;

/// A rejected document transaction. The document is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// A change ends before it starts.
    #[error("Invalid range: {from}..{to}")]
    InvalidRange { from: usize, to: usize },

    /// Two changes touch the same text.
    #[error("Overlapping changes at offset {at}")]
    Overlapping { at: usize },

    /// A change reaches past the end of the document.
    #[error("Range {from}..{to} is out of bounds (length {len})")]
    OutOfBounds { from: usize, to: usize, len: usize },
}

/// Why a fix action could not be applied.
///
/// Every variant leaves the document unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The finding carries no action, or the action has no operation.
    #[error("Finding has no action")]
    NoAction,

    /// The finding no longer maps onto the document.
    #[error("Finding position is no longer valid")]
    StalePosition,

    /// A replacement was requested but there is nothing to replace with.
    #[error("No suggestions available")]
    NoSuggestions,

    /// The chosen suggestion does not exist.
    #[error("Suggestion {index} is out of range ({len} available)")]
    SuggestionOutOfRange { index: usize, len: usize },

    /// The operation name is not one Valet knows how to apply.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Suggestions must be fetched from a dictionary first.
    #[error("Suggestions must be looked up before applying")]
    LookupRequired,

    /// The finding reference does not belong to the installed batch.
    #[error("Finding is not part of the current batch")]
    UnknownFinding,

    /// The document rejected the edit.
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// A dictionary lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Dictionary lookup failed: {0}")]
pub struct DictionaryError(pub String);

impl DictionaryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
