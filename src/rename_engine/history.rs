//! Undo/redo stacks of executed rename batches.
//!
//! Batches reference entries by id only, so removing an entry never leaves a
//! dangling reference; it just purges that id's operations.

use std::path::PathBuf;

use super::registry::EntryId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOp {
    pub id: EntryId,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
}

impl RenameOp {
    pub fn inverse(&self) -> Self {
        Self {
            id: self.id,
            old_path: self.new_path.clone(),
            new_path: self.old_path.clone(),
        }
    }
}

/// One rename pass, in the order the renames were applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryBatch {
    pub ops: Vec<RenameOp>,
}

impl HistoryBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: RenameOp) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl From<Vec<RenameOp>> for HistoryBatch {
    fn from(ops: Vec<RenameOp>) -> Self {
        Self { ops }
    }
}

#[derive(Debug, Default)]
pub struct History {
    undo: Vec<HistoryBatch>,
    redo: Vec<HistoryBatch>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Record a freshly executed batch. Empty batches are ignored; anything
    /// else starts a new timeline, so the redo stack is dropped.
    pub fn record(&mut self, batch: HistoryBatch) -> bool {
        if batch.is_empty() {
            return false;
        }
        self.undo.push(batch);
        self.redo.clear();
        true
    }

    pub fn pop_undo(&mut self) -> Option<HistoryBatch> {
        self.undo.pop()
    }

    pub fn pop_redo(&mut self) -> Option<HistoryBatch> {
        self.redo.pop()
    }

    /// Push onto the undo stack without touching redo (used by redo and to
    /// restore a batch that could not be applied).
    pub fn push_undo(&mut self, batch: HistoryBatch) {
        if !batch.is_empty() {
            self.undo.push(batch);
        }
    }

    pub fn push_redo(&mut self, batch: HistoryBatch) {
        if !batch.is_empty() {
            self.redo.push(batch);
        }
    }

    /// Remove every operation that references `id` from both stacks and drop
    /// batches left empty. Returns how many operations were removed.
    pub fn purge(&mut self, id: EntryId) -> usize {
        purge_stack(&mut self.undo, id) + purge_stack(&mut self.redo, id)
    }
}

fn purge_stack(stack: &mut Vec<HistoryBatch>, id: EntryId) -> usize {
    let mut removed = 0;
    for batch in stack.iter_mut() {
        let before = batch.ops.len();
        batch.ops.retain(|op| op.id != id);
        removed += before - batch.ops.len();
    }
    stack.retain(|batch| !batch.is_empty());
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename_engine::registry::Registry;
    use std::fs;
    use tempfile::TempDir;

    fn two_ids() -> (TempDir, EntryId, EntryId) {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, "").unwrap();
        fs::write(&b, "").unwrap();
        let mut registry = Registry::new();
        registry.extend([&a, &b]);
        let ids: Vec<_> = registry.iter().map(|e| e.id).collect();
        (dir, ids[0], ids[1])
    }

    fn op(id: EntryId, from: &str, to: &str) -> RenameOp {
        RenameOp {
            id,
            old_path: PathBuf::from(from),
            new_path: PathBuf::from(to),
        }
    }

    #[test]
    fn recording_clears_redo() {
        let (_dir, a, _) = two_ids();
        let mut history = History::new();
        history.record(vec![op(a, "a", "b")].into());
        let batch = history.pop_undo().unwrap();
        history.push_redo(batch);
        assert!(history.can_redo());

        history.record(vec![op(a, "a", "c")].into());
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn empty_batches_are_never_recorded() {
        let mut history = History::new();
        assert!(!history.record(HistoryBatch::new()));
        assert!(!history.can_undo());
    }

    #[test]
    fn purge_drops_emptied_batches_from_both_stacks() {
        let (_dir, a, b) = two_ids();
        let mut history = History::new();
        history.record(vec![op(a, "a", "a2"), op(b, "b", "b2")].into());
        history.record(vec![op(a, "a2", "a3")].into());
        let top = history.pop_undo().unwrap();
        history.push_redo(top);

        assert_eq!(history.purge(a), 2);
        assert_eq!(history.undo_depth(), 1);
        assert!(!history.can_redo());
        assert_eq!(history.pop_undo().unwrap().ops, vec![op(b, "b", "b2")]);
    }

    #[test]
    fn inverse_swaps_paths() {
        let (_dir, a, _) = two_ids();
        let forward = op(a, "x", "y");
        assert_eq!(forward.inverse(), op(a, "y", "x"));
    }
}
