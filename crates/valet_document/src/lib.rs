//! # valet_document
//!
//! Keeps Vale findings attached to a live document.
//!
//! This crate provides:
//! - A char-indexed `Document` with atomic transactions
//! - Change sets and position mapping through edits
//! - Mapping findings to offsets and the decoration reducer
//! - Classifying and applying fix actions
//! - Spelling suggestions, hover lookup and the action menu
//! - `LintSession`, the per-document entry point for hosts
//!
//! ## Example
//!
//! ```rust,ignore
//! use valet_document::LintSession;
//!
//! let mut session = LintSession::new(text, ".md", config.runner(), spelling);
//! session.refresh().await?;
//!
//! if let Some(id) = session.query_hover(offset) {
//!     session.apply_action(id, Some(0)).await;
//! }
//! ```

pub mod action;
mod change;
mod decoration;
mod document;
mod error;
pub mod hover;
mod position;
mod session;
pub mod spelling;

pub use action::{ClassifiedAction, Operation, classify, plan_edit};
pub use change::{Assoc, Change, ChangeSet};
pub use decoration::{Decoration, DecorationEvent, DecorationSet, FindingRef};
pub use document::{Document, LineTable};
pub use error::{ActionError, DictionaryError, EditError};
pub use hover::{ActionMenu, MenuItem, query_hover};
pub use position::{TextRange, map_to_offsets};
pub use session::{LintSession, Summary, resolve_action};
pub use spelling::{Dictionary, NullDictionary, SpellingCache};
