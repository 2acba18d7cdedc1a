//! Change sets and position mapping through edits.
//!
//! A [`ChangeSet`] describes one transaction: a list of replacements whose
//! offsets all refer to the document *before* the transaction. Positions
//! recorded against the old document are carried forward with
//! [`ChangeSet::map_pos`].

use crate::EditError;

/// Which side of an insertion a mapped position sticks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    /// Stay before text inserted at the position.
    Before,
    /// Move after text inserted at the position.
    After,
}

/// Replace `from..to` with `insert`. Offsets are in chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

impl Change {
    pub fn new(from: usize, to: usize, insert: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: insert.into(),
        }
    }

    /// Pure insertion at `at`.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }

    /// Deletion of `from..to`.
    pub fn delete(from: usize, to: usize) -> Self {
        Self::new(from, to, "")
    }

    /// Number of chars inserted.
    pub fn inserted_len(&self) -> usize {
        self.insert.chars().count()
    }

    /// Number of chars removed.
    pub fn deleted_len(&self) -> usize {
        self.to - self.from
    }
}

/// An ordered set of non-overlapping changes applied as one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Builds a change set, sorting changes by position.
    ///
    /// Insertions at the same offset keep their given order. Changes whose
    /// ranges overlap are rejected.
    pub fn new(mut changes: Vec<Change>) -> Result<Self, EditError> {
        for change in &changes {
            if change.from > change.to {
                return Err(EditError::InvalidRange {
                    from: change.from,
                    to: change.to,
                });
            }
        }

        changes.sort_by_key(|c| (c.from, c.to));

        for pair in changes.windows(2) {
            if pair[1].from < pair[0].to {
                return Err(EditError::Overlapping { at: pair[1].from });
            }
        }

        Ok(Self { changes })
    }

    /// A change set with a single change.
    pub fn single(change: Change) -> Result<Self, EditError> {
        Self::new(vec![change])
    }

    /// The empty change set.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Net change in document length.
    pub fn len_delta(&self) -> isize {
        self.changes
            .iter()
            .map(|c| c.inserted_len() as isize - c.deleted_len() as isize)
            .sum()
    }

    /// Maps a position in the old document to the new one.
    ///
    /// - Positions before every change are unchanged.
    /// - Positions after a change shift by its length delta.
    /// - A position inside a replaced range collapses onto the inserted text:
    ///   to its start for [`Assoc::Before`] or for the range's own start,
    ///   otherwise to its end.
    /// - A position at a pure insertion follows `assoc`.
    pub fn map_pos(&self, pos: usize, assoc: Assoc) -> usize {
        let mut delta: isize = 0;

        for change in &self.changes {
            if pos < change.from {
                break;
            }

            let inserted = change.inserted_len();
            let replaces = change.from < change.to;
            let passes =
                pos > change.to || (pos == change.to && (replaces || assoc == Assoc::After));

            if passes {
                delta += inserted as isize - change.deleted_len() as isize;
                continue;
            }

            let mapped_from = offset(change.from, delta);
            return if (pos == change.from && replaces) || assoc == Assoc::Before {
                mapped_from
            } else {
                mapped_from + inserted
            };
        }

        offset(pos, delta)
    }

    /// Maps a range, returning `None` if it collapses.
    ///
    /// The start sticks after and the end sticks before inserted text, so a
    /// range never grows to cover text typed at its edges.
    pub fn map_range(&self, from: usize, to: usize) -> Option<(usize, usize)> {
        let from = self.map_pos(from, Assoc::After);
        let to = self.map_pos(to, Assoc::Before);
        (from < to).then_some((from, to))
    }
}

fn offset(pos: usize, delta: isize) -> usize {
    pos.saturating_add_signed(delta)
}
