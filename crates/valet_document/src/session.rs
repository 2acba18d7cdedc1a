//! Per-document lint session.
//!
//! A [`LintSession`] ties one document to its check runner, its decoration
//! batch and the shared spelling cache. Hosts forward edits through
//! [`LintSession::on_document_changed`] and install check results with
//! [`LintSession::install_findings`], always in document-change order.

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use valet_core::{CheckResult, CheckRunner, Finding, Severity};

use crate::action::{ClassifiedAction, classify, try_apply_classified};
use crate::decoration::{DecorationEvent, DecorationSet, FindingRef};
use crate::hover::{ActionMenu, query_hover};
use crate::spelling::SpellingCache;
use crate::{ActionError, Change, ChangeSet, Document, EditError};

/// Classifies a finding's action and fills in dictionary suggestions.
///
/// A failed lookup leaves the suggestion list empty.
pub async fn resolve_action(
    finding: &Finding,
    spelling: &SpellingCache,
) -> Option<ClassifiedAction> {
    let action = classify(finding.action.as_ref())?;
    if !action.needs_external_lookup {
        return Some(action);
    }

    let suggestions = match spelling.suggestions(&finding.r#match).await {
        Ok(suggestions) => suggestions,
        Err(e) => {
            debug!("{}", e);
            Vec::new()
        }
    };
    Some(action.with_suggestions(suggestions))
}

/// Finding counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub suggestions: usize,
}

impl Summary {
    pub fn from_findings<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        let mut summary = Self::default();
        for finding in findings {
            match finding.severity_level() {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Suggestion => summary.suggestions += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.suggestions
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} errors, {} warnings, {} suggestions",
            self.errors, self.warnings, self.suggestions
        )
    }
}

/// One open document and its findings.
pub struct LintSession {
    document: Document,
    decorations: DecorationSet,
    runner: CheckRunner,
    spelling: Arc<SpellingCache>,
    format: String,
}

impl LintSession {
    /// Opens a session. `format` is the extension hint, e.g. `.md`.
    pub fn new(
        text: impl Into<String>,
        format: impl Into<String>,
        runner: CheckRunner,
        spelling: Arc<SpellingCache>,
    ) -> Self {
        Self {
            document: Document::new(text),
            decorations: DecorationSet::new(),
            runner,
            spelling,
            format: format.into(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    pub fn runner(&self) -> &CheckRunner {
        &self.runner
    }

    /// Swaps the runner, e.g. after a configuration change.
    pub fn set_runner(&mut self, runner: CheckRunner) {
        self.runner = runner;
    }

    pub fn spelling(&self) -> &Arc<SpellingCache> {
        &self.spelling
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Runs (or joins) a check of `text`.
    pub async fn check_document(&self, text: &str, format: &str) -> CheckResult {
        self.runner.run(text, format).await
    }

    /// Checks the current text and installs the result.
    ///
    /// Holding `&mut self` keeps the document unchanged while the check runs,
    /// so the result always matches the line table it is mapped against.
    pub async fn refresh(&mut self) -> CheckResult {
        let text = self.document.text().to_string();
        let result = self.runner.run(&text, &self.format).await?;
        self.install_findings(result.first_file_findings().to_vec());
        Ok(result)
    }

    /// Applies an edit to the document and remaps decorations through it.
    pub fn on_document_changed(&mut self, changes: ChangeSet) -> Result<(), EditError> {
        self.document.apply(&changes)?;
        self.decorations = self
            .decorations
            .reduce(&DecorationEvent::DocumentChanged(changes), &self.document);
        Ok(())
    }

    /// Replaces the whole text. Every decoration collapses.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        let changes = ChangeSet::single(Change::new(0, self.document.len_chars(), text))?;
        self.on_document_changed(changes)
    }

    /// Discards the current batch and decorates `findings`.
    pub fn install_findings(&mut self, findings: Vec<Finding>) {
        self.decorations = self
            .decorations
            .reduce(&DecorationEvent::FindingsReplaced(findings), &self.document);
    }

    /// Removes every decoration.
    pub fn clear(&mut self) {
        self.install_findings(Vec::new());
    }

    /// Applies a finding's fix, looking up spelling suggestions if needed.
    pub async fn try_apply_action(
        &mut self,
        id: FindingRef,
        index: Option<usize>,
    ) -> Result<ChangeSet, ActionError> {
        let finding = self
            .decorations
            .finding(id)
            .cloned()
            .ok_or(ActionError::UnknownFinding)?;
        let action = resolve_action(&finding, &self.spelling)
            .await
            .ok_or(ActionError::NoAction)?;

        let changes = try_apply_classified(&mut self.document, &finding, &action, index)?;
        self.decorations = self.decorations.reduce(
            &DecorationEvent::DocumentChanged(changes.clone()),
            &self.document,
        );
        Ok(changes)
    }

    /// Applies a finding's fix, reporting only success.
    pub async fn apply_action(&mut self, id: FindingRef, index: Option<usize>) -> bool {
        match self.try_apply_action(id, index).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Action not applied: {}", e);
                false
            }
        }
    }

    /// The finding under `offset`.
    pub fn query_hover(&self, offset: usize) -> Option<FindingRef> {
        query_hover(&self.decorations, offset)
    }

    /// The action menu for a finding of the current batch.
    pub async fn action_menu(&self, id: FindingRef) -> Option<ActionMenu> {
        let finding = self.decorations.finding(id)?;
        let action = resolve_action(finding, &self.spelling).await;
        Some(ActionMenu::new(id, finding, action.as_ref()))
    }

    /// Counts of the installed findings.
    pub fn summary(&self) -> Summary {
        Summary::from_findings(self.decorations.findings().iter().map(Arc::as_ref))
    }
}

impl fmt::Debug for LintSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LintSession")
            .field("format", &self.format)
            .field("length", &self.document.len_chars())
            .field("decorations", &self.decorations.len())
            .finish()
    }
}
