use crate::model::EditorState;

const MAX_HISTORY_SIZE: usize = 100;

/// Undo/redo over whole snapshots.
///
/// Snapshots are immutable, so history is a list of them with a cursor; no
/// inverse operations are recorded.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    entries: Vec<EditorState>,
    current: usize,
    max_steps: usize,
}

impl UndoHistory {
    pub fn new(initial: EditorState) -> Self {
        Self::with_capacity(initial, MAX_HISTORY_SIZE)
    }

    pub fn with_capacity(initial: EditorState, max_steps: usize) -> Self {
        Self {
            entries: vec![initial],
            current: 0,
            max_steps: max_steps.max(1),
        }
    }

    pub fn current(&self) -> &EditorState {
        &self.entries[self.current]
    }

    /// Record `state` as the new current snapshot, dropping any redo states
    pub fn push(&mut self, state: EditorState) {
        self.entries.truncate(self.current + 1);
        self.entries.push(state);

        if self.entries.len() > self.max_steps + 1 {
            self.entries.remove(0);
        }
        self.current = self.entries.len() - 1;
    }

    /// Replace the current snapshot without creating an undo step
    pub fn replace_current(&mut self, state: EditorState) {
        self.entries[self.current] = state;
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    /// Step back; returns the restored snapshot
    pub fn undo(&mut self) -> Option<&EditorState> {
        if !self.can_undo() {
            return None;
        }
        self.current -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&EditorState> {
        if !self.can_redo() {
            return None;
        }
        self.current += 1;
        Some(self.current())
    }
}
