use crate::richtext::element::{Element, Range};

const MAX_HISTORY_SIZE: usize = 100;

/// Snapshot of an element list and its caret
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub elements: Vec<Element>,
    pub range: Range,
}

impl HistoryEntry {
    pub fn new(elements: Vec<Element>, range: Range) -> Self {
        HistoryEntry { elements, range }
    }
}

/// Undo stack of document snapshots
#[derive(Debug)]
pub struct ControlHistory {
    entries: Vec<HistoryEntry>,
    current_index: Option<usize>,
}

impl ControlHistory {
    pub fn new() -> Self {
        ControlHistory {
            entries: Vec::new(),
            current_index: None,
        }
    }

    /// Record a new snapshot
    /// This clears any redo history and adds the new entry
    pub fn push(&mut self, elements: Vec<Element>, range: Range) {
        // Drop everything after the current position
        if let Some(idx) = self.current_index {
            self.entries.truncate(idx + 1);
        }

        self.entries.push(HistoryEntry::new(elements, range));

        if self.entries.len() > MAX_HISTORY_SIZE {
            self.entries.remove(0);
        }

        self.current_index = Some(self.entries.len() - 1);
    }

    pub fn can_undo(&self) -> bool {
        self.current_index.is_some_and(|idx| idx > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.current_index
            .is_some_and(|idx| idx + 1 < self.entries.len())
    }

    /// Step back one snapshot
    /// Returns the snapshot to restore, or None at the oldest entry
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if let Some(idx) = self.current_index
            && idx > 0 {
                self.current_index = Some(idx - 1);
                return self.entries.get(idx - 1);
            }
        None
    }

    /// Step forward one snapshot
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if let Some(idx) = self.current_index
            && idx + 1 < self.entries.len() {
                self.current_index = Some(idx + 1);
                return self.entries.get(idx + 1);
            }
        None
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.current_index.and_then(|idx| self.entries.get(idx))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for ControlHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(text: &str) -> Vec<Element> {
        vec![Element::text(text)]
    }

    #[test]
    fn test_push_and_undo() {
        let mut history = ControlHistory::new();
        assert!(!history.can_undo());

        history.push(snapshot("a"), Range::collapsed(0));
        history.push(snapshot("b"), Range::collapsed(1));
        assert!(history.can_undo());
        assert!(!history.can_redo());

        let entry = history.undo().unwrap();
        assert_eq!(entry.elements, snapshot("a"));
        assert_eq!(entry.range, Range::collapsed(0));
        assert!(history.undo().is_none());

        let entry = history.redo().unwrap();
        assert_eq!(entry.elements, snapshot("b"));
    }

    #[test]
    fn test_push_truncates_redo() {
        let mut history = ControlHistory::new();
        history.push(snapshot("a"), Range::default());
        history.push(snapshot("b"), Range::default());
        history.push(snapshot("c"), Range::default());

        history.undo();
        history.undo();
        history.push(snapshot("d"), Range::default());

        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.current().unwrap().elements, snapshot("d"));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = ControlHistory::new();
        for i in 0..(MAX_HISTORY_SIZE + 10) {
            history.push(snapshot(&i.to_string()), Range::default());
        }
        assert_eq!(history.len(), MAX_HISTORY_SIZE);
        assert_eq!(
            history.current().unwrap().elements,
            snapshot(&(MAX_HISTORY_SIZE + 9).to_string())
        );
    }
}
