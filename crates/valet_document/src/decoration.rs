//! Decoration store.
//!
//! Decorations are a pure function of events: [`DecorationSet::reduce`] takes
//! the previous set and either a document change (remap every decoration) or
//! a new findings batch (discard and rebuild). Hosts only feed events in
//! document-change order and render the result.

use std::sync::Arc;

use tracing::debug;
use valet_core::{Finding, Severity};

use crate::position::{TextRange, map_to_offsets};
use crate::{ChangeSet, LineTable};

/// Identifies a finding within one installed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FindingRef {
    pub generation: u64,
    pub index: usize,
}

/// One rendered annotation over a document range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub range: TextRange,
    pub severity: Severity,
    pub id: FindingRef,
    pub finding: Arc<Finding>,
}

impl Decoration {
    /// Tooltip text, `"<Severity>: <Message> (<Check>)"`.
    pub fn title(&self) -> String {
        format!(
            "{}: {} ({})",
            self.finding.severity, self.finding.message, self.finding.check
        )
    }

    /// Style class for the severity, e.g. `vale-warning`.
    pub fn class_name(&self) -> String {
        format!("vale-{}", self.severity)
    }
}

/// Input to [`DecorationSet::reduce`].
#[derive(Debug, Clone)]
pub enum DecorationEvent {
    /// The document was edited by this transaction.
    DocumentChanged(ChangeSet),
    /// A new batch replaces every existing decoration.
    FindingsReplaced(Vec<Finding>),
}

/// The current batch of decorations, sorted by range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    generation: u64,
    findings: Vec<Arc<Finding>>,
    decorations: Vec<Decoration>,
}

impl DecorationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces the next state for `event`.
    ///
    /// `table` must describe the document *after* any change carried by the
    /// event; it is only consulted when a new batch is built.
    pub fn reduce(&self, event: &DecorationEvent, table: &impl LineTable) -> Self {
        match event {
            DecorationEvent::DocumentChanged(changes) => self.map(changes),
            DecorationEvent::FindingsReplaced(findings) => {
                Self::build(self.generation + 1, findings, table)
            }
        }
    }

    /// Builds a batch from scratch. Findings that do not map are dropped.
    pub fn build(generation: u64, findings: &[Finding], table: &impl LineTable) -> Self {
        let findings: Vec<Arc<Finding>> = findings.iter().cloned().map(Arc::new).collect();

        let mut decorations: Vec<Decoration> = findings
            .iter()
            .enumerate()
            .filter_map(|(index, finding)| {
                let Some(range) = map_to_offsets(finding, table) else {
                    debug!(
                        "Dropping {} at line {} span {:?}: out of range",
                        finding.check, finding.line, finding.span
                    );
                    return None;
                };
                Some(Decoration {
                    range,
                    severity: finding.severity_level(),
                    id: FindingRef { generation, index },
                    finding: Arc::clone(finding),
                })
            })
            .collect();
        decorations.sort_by_key(|d| (d.range, d.id));

        debug!(
            "Built {} decoration(s) from {} finding(s)",
            decorations.len(),
            findings.len()
        );

        Self {
            generation,
            findings,
            decorations,
        }
    }

    /// Remaps every decoration through an edit. Collapsed ones are dropped.
    pub fn map(&self, changes: &ChangeSet) -> Self {
        if changes.is_empty() {
            return self.clone();
        }

        let mut decorations: Vec<Decoration> = self
            .decorations
            .iter()
            .filter_map(|decoration| {
                let (from, to) = changes.map_range(decoration.range.from, decoration.range.to)?;
                Some(Decoration {
                    range: TextRange::new(from, to),
                    ..decoration.clone()
                })
            })
            .collect();
        decorations.sort_by_key(|d| (d.range, d.id));

        Self {
            generation: self.generation,
            findings: self.findings.clone(),
            decorations,
        }
    }

    /// Batch counter, bumped on every replacement.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Decoration> {
        self.decorations.iter()
    }

    /// Every finding in the batch, including dropped and collapsed ones.
    pub fn findings(&self) -> &[Arc<Finding>] {
        &self.findings
    }

    /// Looks up a finding of this batch.
    pub fn finding(&self, id: FindingRef) -> Option<&Arc<Finding>> {
        if id.generation != self.generation {
            return None;
        }
        self.findings.get(id.index)
    }

    /// The decoration of a finding, if it is still visible.
    pub fn get(&self, id: FindingRef) -> Option<&Decoration> {
        self.decorations.iter().find(|d| d.id == id)
    }
}
