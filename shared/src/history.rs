/// Linear undo/redo over full snapshots.
///
/// `cursor` is `None` only while the sequence is empty. Committing while the
/// cursor is behind the last entry drops everything after it, so redo is lost
/// once a new entry lands after an undo.
#[derive(Clone, Debug)]
pub struct History<S> {
    entries: Vec<S>,
    cursor: Option<usize>,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
        }
    }
}

impl<S: Clone> History<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A history holding exactly one entry.
    pub fn starting_with(initial: S) -> Self {
        let mut history = Self::new();
        history.commit(initial);
        history
    }

    pub fn commit(&mut self, snapshot: S) {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.entries.truncate(keep);
        self.entries.push(snapshot);
        self.cursor = Some(self.entries.len() - 1);
    }

    pub fn undo(&mut self) -> Option<S> {
        match self.cursor {
            Some(cursor) if cursor > 0 => {
                self.cursor = Some(cursor - 1);
                self.entries.get(cursor - 1).cloned()
            }
            _ => None,
        }
    }

    pub fn redo(&mut self) -> Option<S> {
        let next = self.cursor.map_or(0, |cursor| cursor + 1);
        if self.cursor.is_none() || next >= self.entries.len() {
            return None;
        }
        self.cursor = Some(next);
        self.entries.get(next).cloned()
    }

    /// Swaps the entry under the cursor without touching the rest of the
    /// sequence. Returns false on an empty history.
    pub fn replace_current(&mut self, snapshot: S) -> bool {
        match self.cursor.and_then(|cursor| self.entries.get_mut(cursor)) {
            Some(entry) => {
                *entry = snapshot;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self, blank: S) {
        self.entries.clear();
        self.cursor = None;
        self.commit(blank);
    }

    pub fn current(&self) -> Option<&S> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor + 1 < self.entries.len())
    }
}
