//! In-memory document with a line table and atomic transactions.
//!
//! Offsets are counted in chars; lines are separated by `\n`.

use tracing::debug;

use crate::{Change, ChangeSet, EditError};

/// Line structure of a text snapshot.
pub trait LineTable {
    /// Number of lines. An empty document has one line.
    fn line_count(&self) -> usize;

    /// Char offset where the zero-indexed `line` starts.
    fn line_start_offset(&self, line: usize) -> Option<usize>;

    /// Length of the document in chars.
    fn document_length(&self) -> usize;
}

/// A text buffer that tracks its line starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
    line_starts: Vec<usize>,
    len: usize,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let (line_starts, len) = index_lines(&text);
        Self {
            text,
            line_starts,
            len,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len_chars(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Text between two char offsets.
    pub fn slice(&self, from: usize, to: usize) -> Option<&str> {
        if from > to || to > self.len {
            return None;
        }
        let start = self.byte_offset(from)?;
        let end = self.byte_offset(to)?;
        self.text.get(start..end)
    }

    /// Byte offset of a char offset. `len_chars()` maps to the end.
    pub fn byte_offset(&self, offset: usize) -> Option<usize> {
        if offset == self.len {
            return Some(self.text.len());
        }
        self.text.char_indices().nth(offset).map(|(byte, _)| byte)
    }

    /// Zero-indexed line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        }
    }

    /// Applies all changes at once, or none of them.
    pub fn apply(&mut self, changes: &ChangeSet) -> Result<(), EditError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut byte_ranges = Vec::with_capacity(changes.changes().len());
        for change in changes.changes() {
            if change.to > self.len {
                return Err(EditError::OutOfBounds {
                    from: change.from,
                    to: change.to,
                    len: self.len,
                });
            }
            let out_of_bounds = || EditError::OutOfBounds {
                from: change.from,
                to: change.to,
                len: self.len,
            };
            let start = self.byte_offset(change.from).ok_or_else(out_of_bounds)?;
            let end = self.byte_offset(change.to).ok_or_else(out_of_bounds)?;
            byte_ranges.push((start, end, change.insert.as_str()));
        }

        let grown = changes
            .changes()
            .iter()
            .map(|c| c.insert.len())
            .sum::<usize>();
        let mut text = String::with_capacity(self.text.len() + grown);
        let mut cursor = 0;
        for (start, end, insert) in byte_ranges {
            text.push_str(&self.text[cursor..start]);
            text.push_str(insert);
            cursor = end;
        }
        text.push_str(&self.text[cursor..]);

        debug!(
            "Applied {} change(s), length {} -> {}",
            changes.changes().len(),
            self.len,
            self.len.saturating_add_signed(changes.len_delta())
        );
        *self = Self::new(text);
        Ok(())
    }

    /// Replaces `from..to` with `insert` as one transaction.
    ///
    /// Returns the applied change set so callers can remap positions.
    pub fn replace(
        &mut self,
        from: usize,
        to: usize,
        insert: impl Into<String>,
    ) -> Result<ChangeSet, EditError> {
        let changes = ChangeSet::single(Change::new(from, to, insert))?;
        self.apply(&changes)?;
        Ok(changes)
    }
}

impl LineTable for Document {
    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line_start_offset(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    fn document_length(&self) -> usize {
        self.len
    }
}

fn index_lines(text: &str) -> (Vec<usize>, usize) {
    let mut line_starts = vec![0];
    let mut len = 0;
    for (i, c) in text.chars().enumerate() {
        if c == '\n' {
            line_starts.push(i + 1);
        }
        len = i + 1;
    }
    (line_starts, len)
}
