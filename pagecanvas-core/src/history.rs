//! Linear undo/redo over full-document snapshots.
//!
//! ```text
//!   push(A) push(B) push(C) undo undo push(D)
//!   [A]     [A B]   [A B C]  ^B   ^A   [A D]
//! ```
//!
//! A push after an undo discards the undone branch. At most
//! [`MAX_HISTORY`] snapshots are retained; the oldest goes first.

use std::collections::VecDeque;

use crate::document::Document;

/// Maximum number of retained snapshots.
pub const MAX_HISTORY: usize = 50;

/// An immutable deep copy of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    document: Document,
}

impl Snapshot {
    /// Capture a document. The snapshot owns its own copy.
    #[must_use]
    pub fn capture(document: &Document) -> Self {
        Self {
            document: document.clone(),
        }
    }

    /// The captured document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }
}

/// Bounded, truncating history of snapshots.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Snapshot>,
    cursor: Option<usize>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Empty history holding up to [`MAX_HISTORY`] snapshots.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    /// Empty history with a custom bound (at least one entry).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    /// Record a snapshot after the current one, dropping any redo branch.
    pub fn push(&mut self, snapshot: Snapshot) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push_back(snapshot);

        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back one snapshot and return it, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                self.entries.get(c - 1)
            }
            _ => None,
        }
    }

    /// Step forward one snapshot and return it, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        match self.cursor {
            Some(c) if c + 1 < self.entries.len() => {
                self.cursor = Some(c + 1);
                self.entries.get(c + 1)
            }
            _ => None,
        }
    }

    /// Whether [`History::undo`] would move.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    /// Whether [`History::redo`] would move.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// The snapshot matching the live document.
    #[must_use]
    pub fn current(&self) -> Option<&Snapshot> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// Position of the current snapshot.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of retained snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PageSettings;

    fn snap(color: &str) -> Snapshot {
        Snapshot::capture(&Document {
            elements: Vec::new(),
            page_settings: PageSettings {
                background_color: color.to_string(),
                ..PageSettings::default()
            },
        })
    }

    fn color(s: Option<&Snapshot>) -> Option<String> {
        s.map(|s| s.document().page_settings.background_color.clone())
    }

    #[test]
    fn test_undo_redo_walks_entries() {
        let mut h = History::new();
        h.push(snap("a"));
        h.push(snap("b"));
        h.push(snap("c"));

        assert_eq!(color(h.undo()), Some("b".into()));
        assert_eq!(color(h.undo()), Some("a".into()));
        assert!(h.undo().is_none());
        assert_eq!(color(h.redo()), Some("b".into()));
        assert_eq!(color(h.redo()), Some("c".into()));
        assert!(h.redo().is_none());
    }

    #[test]
    fn test_push_after_undo_truncates_redo_branch() {
        let mut h = History::new();
        h.push(snap("a"));
        h.push(snap("b"));
        h.push(snap("c"));
        h.undo();
        h.undo();
        h.push(snap("d"));

        assert_eq!(h.len(), 2);
        assert!(!h.can_redo());
        assert_eq!(color(h.current()), Some("d".into()));
        assert_eq!(color(h.undo()), Some("a".into()));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut h = History::new();
        for i in 0..(MAX_HISTORY + 5) {
            h.push(snap(&i.to_string()));
        }
        assert_eq!(h.len(), MAX_HISTORY);
        assert_eq!(h.cursor(), Some(MAX_HISTORY - 1));
        assert_eq!(color(h.current()), Some((MAX_HISTORY + 4).to_string()));

        let mut steps = 0;
        while h.undo().is_some() {
            steps += 1;
        }
        assert_eq!(steps, MAX_HISTORY - 1);
        assert_eq!(color(h.current()), Some("5".into()));
    }

    #[test]
    fn test_empty_history_boundaries() {
        let mut h = History::with_capacity(0);
        assert!(h.is_empty());
        assert!(h.undo().is_none());
        assert!(h.redo().is_none());
        h.push(snap("a"));
        h.push(snap("b"));
        assert_eq!(h.len(), 1);
        assert!(!h.can_undo());
    }

    #[test]
    fn test_snapshot_is_independent_of_source() {
        let mut doc = Document::empty();
        let s = Snapshot::capture(&doc);
        doc.page_settings.background_color = "#123456".into();
        assert_eq!(s.document().page_settings.background_color, "#ffffff");
    }
}
