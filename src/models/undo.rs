use std::collections::VecDeque;
use indexmap::IndexSet;
use super::MetroGraph;

/// Graph state plus the selection that was active when it was recorded
#[derive(Debug, Clone)]
pub struct UndoSnapshot {
    pub graph: MetroGraph,
    pub selection: IndexSet<String>,
}

impl UndoSnapshot {
    #[must_use]
    pub fn new(graph: MetroGraph, selection: IndexSet<String>) -> Self {
        Self { graph, selection }
    }
}

/// Bounded undo/redo history
///
/// Snapshots are recorded after each committed mutation, so the newest entry
/// of the undo stack is always the current state.
#[derive(Debug, Clone)]
pub struct UndoManager {
    undo_stack: VecDeque<UndoSnapshot>,
    redo_stack: VecDeque<UndoSnapshot>,
    max_levels: usize,
}

impl UndoManager {
    #[must_use]
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_levels: max_levels.max(1),
        }
    }

    fn push_bounded(stack: &mut VecDeque<UndoSnapshot>, snapshot: UndoSnapshot, max_levels: usize) {
        stack.push_back(snapshot);
        while stack.len() > max_levels {
            stack.pop_front();
        }
    }

    /// Record the state after a mutation; any redo history is discarded
    pub fn push_snapshot(&mut self, snapshot: UndoSnapshot) {
        self.redo_stack.clear();
        Self::push_bounded(&mut self.undo_stack, snapshot, self.max_levels);
    }

    /// Step back, returning the state to restore
    ///
    /// `current` goes onto the redo stack. Nothing changes when there is no
    /// earlier state.
    pub fn undo(&mut self, current: UndoSnapshot) -> Option<UndoSnapshot> {
        if !self.can_undo() {
            return None;
        }
        // newest entry is the current state
        self.undo_stack.pop_back();
        let previous = self.undo_stack.back().cloned()?;
        Self::push_bounded(&mut self.redo_stack, current, self.max_levels);
        Some(previous)
    }

    /// Step forward again, returning the state to restore
    pub fn redo(&mut self) -> Option<UndoSnapshot> {
        let next = self.redo_stack.pop_back()?;
        Self::push_bounded(&mut self.undo_stack, next.clone(), self.max_levels);
        Some(next)
    }

    /// Need at least 2 items: current state + previous state to restore
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drop all history and start again from `current`
    pub fn reset(&mut self, current: UndoSnapshot) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_stack.push_back(current);
    }

    /// Change the depth limit, evicting the oldest entries if needed
    pub fn set_max_levels(&mut self, max_levels: usize) {
        self.max_levels = max_levels.max(1);
        while self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }
        while self.redo_stack.len() > self.max_levels {
            self.redo_stack.pop_front();
        }
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_UNDO_LEVELS)
    }
}
