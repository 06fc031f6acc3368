//! Batch rename engine: tracked entries, previews, execution and history.
//!
//! Every call runs to completion synchronously. The engine is single-owner;
//! callers serialise access (the TUI funnels background results through one
//! channel before touching it).

mod executor;
mod history;
mod preview;
mod registry;

use std::path::Path;
use tracing::{info, warn};

pub use executor::{BatchKind, BatchSummary, rename_no_clobber};
pub use history::{HistoryBatch, RenameOp};
pub use preview::{NameSource, Preview, PreviewItem, PreviewStatus, Substitution, resolve_name};
pub use registry::{Entry, EntryId, occupied};

use crate::error::RenameError;
use executor::{Replay, execute_batch, replay_batch};
use history::History;
use registry::Registry;

/// Counts reported by [`RenameEngine::reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    pub kept: usize,
    pub removed: usize,
}

#[derive(Debug, Default)]
pub struct RenameEngine {
    registry: Registry,
    history: History,
}

impl RenameEngine {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            history: History::new(),
        }
    }

    /// Replace the tracked set. Paths that do not exist are dropped and ids
    /// from before the call are invalidated.
    pub fn set_files<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let stale: Vec<EntryId> = self.registry.iter().map(|e| e.id).collect();
        for id in stale {
            self.history.purge(id);
        }
        self.registry.replace_all(paths);
        info!(count = self.registry.len(), "Tracking files");
    }

    /// Track additional paths; already tracked or missing ones are ignored.
    pub fn add_files<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let added = self.registry.extend(paths);
        info!(added, total = self.registry.len(), "Added files");
        added
    }

    /// Set (or with `None`, clear) the literal name that takes precedence
    /// over the pattern. Unknown ids are ignored.
    pub fn set_override(&mut self, id: EntryId, name: Option<String>) {
        if !self.registry.set_override(id, name) {
            warn!(%id, "Override for unknown entry ignored");
        }
    }

    /// Stop tracking an entry and forget every history operation on it.
    pub fn remove_by_id(&mut self, id: EntryId) -> bool {
        let Some(entry) = self.registry.remove(id) else {
            return false;
        };
        let purged = self.history.purge(id);
        info!(path = %entry.path.display(), purged, "Removed entry");
        true
    }

    /// Drop entries whose path is gone from disk.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let missing = self.registry.missing_ids();
        for id in &missing {
            if let Some(entry) = self.registry.remove(*id) {
                warn!(path = %entry.path.display(), "File no longer exists; removed from list");
            }
            self.history.purge(*id);
        }
        ReconcileReport {
            kept: self.registry.len(),
            removed: missing.len(),
        }
    }

    /// Compute candidate names without touching the disk.
    pub fn preview(&mut self, pattern: &str, replacement: &str) -> Result<Preview, RenameError> {
        self.reconcile();
        preview::build_preview(&self.registry, pattern, replacement)
    }

    /// Apply a preview previously returned by [`preview`](Self::preview).
    /// Items with a warning, no-op items and stale items are skipped.
    pub fn execute(&mut self, items: &[PreviewItem]) -> Result<BatchSummary, RenameError> {
        let result = execute_batch(&mut self.registry, &mut self.history, items);
        if result.is_err() {
            self.reconcile();
        }
        result
    }

    pub fn undo(&mut self) -> Result<BatchSummary, RenameError> {
        self.reconcile();
        let batch = self.history.pop_undo().ok_or(RenameError::NothingToUndo)?;
        let replay = replay_batch(&mut self.registry, batch.clone());
        self.settle(batch, replay, BatchKind::Undo)
    }

    pub fn redo(&mut self) -> Result<BatchSummary, RenameError> {
        self.reconcile();
        let batch = self.history.pop_redo().ok_or(RenameError::NothingToRedo)?;
        let replay = replay_batch(&mut self.registry, batch.clone());
        self.settle(batch, replay, BatchKind::Redo)
    }

    /// Route a replay's pieces onto the right stacks.
    fn settle(
        &mut self,
        original: HistoryBatch,
        replay: Replay,
        kind: BatchKind,
    ) -> Result<BatchSummary, RenameError> {
        type Push = fn(&mut History, HistoryBatch);

        let summary = replay.summary(kind);
        let (push_source, push_target): (Push, Push) = match kind {
            BatchKind::Redo => (History::push_redo, History::push_undo),
            _ => (History::push_undo, History::push_redo),
        };

        if let Some((op, source)) = replay.failure {
            push_source(&mut self.history, replay.remaining);
            push_target(&mut self.history, replay.applied);
            self.reconcile();
            return Err(RenameError::Filesystem {
                from: op.new_path,
                to: op.old_path,
                renamed: summary.renamed,
                source,
            });
        }

        if replay.applied.is_empty() {
            push_source(&mut self.history, original);
            return Err(RenameError::NothingApplied {
                missing: summary.missing + summary.skipped + summary.stale,
            });
        }

        push_target(&mut self.history, replay.applied);
        info!(%summary, "History step applied");
        Ok(summary)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of batches on the undo and redo stacks.
    pub fn history_depth(&self) -> (usize, usize) {
        (self.history.undo_depth(), self.history.redo_depth())
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.registry.iter()
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.registry.get(id)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn engine_with(names: &[&str]) -> (TempDir, RenameEngine) {
        let dir = TempDir::new().unwrap();
        let paths: Vec<_> = names
            .iter()
            .map(|n| {
                let p = dir.path().join(n);
                fs::write(&p, n).unwrap();
                p
            })
            .collect();
        let mut engine = RenameEngine::new();
        engine.set_files(&paths);
        (dir, engine)
    }

    #[test]
    fn set_files_drops_history_of_replaced_entries() {
        let (dir, mut engine) = engine_with(&["a.txt"]);
        let preview = engine.preview("a", "b").unwrap();
        engine.execute(&preview.items).unwrap();
        assert!(engine.can_undo());

        engine.set_files([dir.path().join("b.txt")]);
        assert!(!engine.can_undo());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn reconcile_reports_kept_and_removed() {
        let (dir, mut engine) = engine_with(&["a.txt", "b.txt"]);
        fs::remove_file(dir.path().join("a.txt")).unwrap();
        assert_eq!(engine.reconcile(), ReconcileReport { kept: 1, removed: 1 });
    }

    #[test]
    fn undo_with_every_file_gone_leaves_stacks_alone() {
        let (dir, mut engine) = engine_with(&["a.txt"]);
        let preview = engine.preview("a", "b").unwrap();
        engine.execute(&preview.items).unwrap();

        // Put an unrelated file where the original lived; the undo must not clobber it.
        fs::write(dir.path().join("a.txt"), "new").unwrap();
        let err = engine.undo().unwrap_err();
        assert!(matches!(err, RenameError::NothingApplied { .. }));
        assert!(engine.can_undo());
        assert!(!engine.can_redo());
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "new");
    }

    #[test]
    fn set_override_on_unknown_id_is_a_no_op() {
        let (_dir, mut engine) = engine_with(&["a.txt"]);
        let id = engine.entries().next().unwrap().id;
        engine.remove_by_id(id);
        engine.set_override(id, Some("x.txt".into()));
        assert!(engine.is_empty());
    }
}
