//! Mapping findings onto document offsets.

use valet_core::Finding;

use crate::LineTable;

/// Absolute char range `from..to` in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRange {
    pub from: usize,
    pub to: usize,
}

impl TextRange {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }

    /// True if `offset` lies within `from..to`.
    pub fn contains(&self, offset: usize) -> bool {
        self.from <= offset && offset < self.to
    }

    /// True if `offset` lies within the range, both ends included.
    pub fn touches(&self, offset: usize) -> bool {
        self.from <= offset && offset <= self.to
    }
}

/// Converts a finding's line and span into offsets within `table`.
///
/// `from = lineStart + span[0] - 1` and `to = lineStart + span[1]`. Returns
/// `None` unless `0 <= from < to <= length`, or if the sum overflows. The
/// result depends only on the finding and the snapshot, so it can be
/// recomputed at any time.
pub fn map_to_offsets(finding: &Finding, table: &impl LineTable) -> Option<TextRange> {
    let line = finding.line.checked_sub(1)?;
    if line >= table.line_count() {
        return None;
    }
    let line_start = table.line_start_offset(line)?;

    // Spans come straight from the engine's output; overflow means out of range.
    let from = line_start.checked_add(finding.span[0])?.checked_sub(1)?;
    let to = line_start.checked_add(finding.span[1])?;

    if to > table.document_length() || from >= to {
        return None;
    }

    Some(TextRange::new(from, to))
}
