//! Applying previews and replaying history batches on disk.
//!
//! Renames inside one batch are independent filesystem operations. A failure
//! stops the pass but never rolls back the renames that already happened;
//! those stay recorded so they can still be undone.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

use super::history::{History, HistoryBatch, RenameOp};
use super::preview::PreviewItem;
use super::registry::{Registry, occupied};
use crate::error::RenameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Execute,
    Undo,
    Redo,
}

/// Aggregate result of one execute/undo/redo call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub kind: BatchKind,
    pub renamed: usize,
    /// Items held back: warnings at execute time, occupied targets at undo/redo time.
    pub skipped: usize,
    /// Operations whose entry was removed or moved since they were computed.
    pub stale: usize,
    /// Files that were no longer on disk when undoing/redoing.
    pub missing: usize,
}

impl BatchSummary {
    pub fn new(kind: BatchKind) -> Self {
        Self {
            kind,
            renamed: 0,
            skipped: 0,
            stale: 0,
            missing: 0,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BatchKind::Execute => write!(f, "Renamed {} item(s)", self.renamed)?,
            BatchKind::Undo => write!(f, "Undid {} rename(s)", self.renamed)?,
            BatchKind::Redo => write!(f, "Redid {} rename(s)", self.renamed)?,
        }
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        if self.missing > 0 {
            write!(f, ", {} missing", self.missing)?;
        }
        if self.stale > 0 {
            write!(f, ", {} stale", self.stale)?;
        }
        Ok(())
    }
}

/// Rename `from` to `to` unless `to` is already taken by a different file.
pub fn rename_no_clobber(from: &Path, to: &Path) -> io::Result<()> {
    if from != to && occupied(to) && !same_file(from, to) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        ));
    }
    fs::rename(from, to)
}

/// Two spellings of one directory entry, as on case-insensitive filesystems.
/// A symlink is never the same file as its target.
fn same_file(a: &Path, b: &Path) -> bool {
    let is_link = |p: &Path| fs::symlink_metadata(p).is_ok_and(|m| m.file_type().is_symlink());
    if is_link(a) || is_link(b) {
        return false;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Rename every actionable preview item, record the batch and re-sort.
///
/// On failure the renames done so far are recorded as a batch of their own
/// and the error is returned; the caller resynchronises the registry.
pub fn execute_batch(
    registry: &mut Registry,
    history: &mut History,
    items: &[PreviewItem],
) -> Result<BatchSummary, RenameError> {
    let mut summary = BatchSummary::new(BatchKind::Execute);
    let mut batch = HistoryBatch::new();

    for item in items {
        if item.original_name == item.new_name {
            continue;
        }
        if !item.is_actionable() {
            debug!(name = %item.original_name, status = %item.status, "Skipping item with warning");
            summary.skipped += 1;
            continue;
        }
        let current = registry.get(item.id).map(|e| e.path.as_path());
        if current != Some(item.old_full_path.as_path()) {
            warn!(id = %item.id, path = %item.old_full_path.display(), "Skipping stale preview item");
            summary.stale += 1;
            continue;
        }

        if let Err(source) = rename_no_clobber(&item.old_full_path, &item.new_full_path) {
            let renamed = batch.len();
            history.record(batch);
            registry.sort();
            return Err(RenameError::Filesystem {
                from: item.old_full_path.clone(),
                to: item.new_full_path.clone(),
                renamed,
                source,
            });
        }

        debug!(from = %item.old_full_path.display(), to = %item.new_full_path.display(), "Renamed");
        registry.set_path(item.id, item.new_full_path.clone());
        registry.set_override(item.id, None);
        batch.push(RenameOp {
            id: item.id,
            old_path: item.old_full_path.clone(),
            new_path: item.new_full_path.clone(),
        });
    }

    summary.renamed = batch.len();
    if history.record(batch) {
        info!(renamed = summary.renamed, "Executed rename batch");
    }
    registry.sort();
    Ok(summary)
}

/// What happened when a history batch was replayed.
#[derive(Debug)]
pub struct Replay {
    /// Inverse of every applied operation, in application order.
    pub applied: HistoryBatch,
    /// Operations not attempted because of `failure`, in their original order.
    pub remaining: HistoryBatch,
    pub skipped: usize,
    pub stale: usize,
    pub missing: usize,
    pub failure: Option<(RenameOp, io::Error)>,
}

impl Replay {
    pub fn summary(&self, kind: BatchKind) -> BatchSummary {
        BatchSummary {
            kind,
            renamed: self.applied.len(),
            skipped: self.skipped,
            stale: self.stale,
            missing: self.missing,
        }
    }
}

/// Move every file of `batch` from its `new_path` back to its `old_path`,
/// newest operation first. Used for both undo and redo: a redo batch holds
/// the inverses recorded by the undo that produced it.
pub fn replay_batch(registry: &mut Registry, batch: HistoryBatch) -> Replay {
    let mut replay = Replay {
        applied: HistoryBatch::new(),
        remaining: HistoryBatch::new(),
        skipped: 0,
        stale: 0,
        missing: 0,
        failure: None,
    };
    let mut ops = batch.ops;

    while let Some(op) = ops.pop() {
        if registry.get(op.id).is_none() {
            replay.stale += 1;
            continue;
        }
        if !occupied(&op.new_path) {
            warn!(path = %op.new_path.display(), "File vanished; dropping it from history");
            replay.missing += 1;
            continue;
        }
        if occupied(&op.old_path) && !same_file(&op.new_path, &op.old_path) {
            warn!(path = %op.old_path.display(), "Original location is occupied; leaving file in place");
            replay.skipped += 1;
            continue;
        }

        match rename_no_clobber(&op.new_path, &op.old_path) {
            Ok(()) => {
                debug!(from = %op.new_path.display(), to = %op.old_path.display(), "Restored");
                registry.set_path(op.id, op.old_path.clone());
                replay.applied.push(op.inverse());
            }
            Err(err) => {
                ops.push(op.clone());
                replay.remaining = HistoryBatch::from(std::mem::take(&mut ops));
                replay.failure = Some((op, err));
                break;
            }
        }
    }

    registry.sort();
    replay
}
