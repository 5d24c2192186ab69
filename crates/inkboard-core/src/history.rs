//! Snapshot history for undo/redo.
//!
//! History is a linear list of full-surface snapshots with a cursor. Index 0
//! is the seed (blank canvas) and the list is never empty. Committing while
//! the cursor is behind the end discards the redo branch first.

use crate::surface::Snapshot;

/// Ordered snapshots plus a cursor naming the current one.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    cursor: usize,
    /// Maximum number of entries to keep; `None` keeps everything.
    limit: Option<usize>,
}

impl History {
    /// Create a history holding only the seed snapshot.
    pub fn new(seed: Snapshot) -> Self {
        Self {
            entries: vec![seed],
            cursor: 0,
            limit: None,
        }
    }

    /// Create a history that evicts its oldest entries beyond `limit`.
    /// A limit of zero is treated as one.
    pub fn with_limit(seed: Snapshot, limit: Option<usize>) -> Self {
        Self {
            limit: limit.map(|l| l.max(1)),
            ..Self::new(seed)
        }
    }

    /// Append a snapshot after the cursor, truncating any redo branch, and
    /// move the cursor onto it.
    pub fn commit(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;

        if let Some(limit) = self.limit {
            if self.entries.len() > limit {
                let excess = self.entries.len() - limit;
                self.entries.drain(..excess);
                self.cursor -= excess;
            }
        }
    }

    /// Step the cursor back. Returns the snapshot to restore, or `None`
    /// when already at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    /// Step the cursor forward. Returns the snapshot to restore, or `None`
    /// when already at the newest entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    /// Snapshot at the cursor.
    pub fn peek_current(&self) -> &Snapshot {
        &self.entries[self.cursor]
    }

    /// Snapshot at an arbitrary index.
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.entries.get(index)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether history holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}
