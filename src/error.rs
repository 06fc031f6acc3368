//! Typed failures surfaced by the rename engine and the name suggester.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenameError {
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A rename failed on disk. `renamed` counts the operations of the same
    /// pass that had already succeeded and were kept.
    #[error("failed to rename {} -> {} ({renamed} renamed before the failure): {source}", .from.display(), .to.display())]
    Filesystem {
        from: PathBuf,
        to: PathBuf,
        renamed: usize,
        #[source]
        source: io::Error,
    },

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("none of the recorded files could be restored ({missing} missing)")]
    NothingApplied { missing: usize },
}

impl RenameError {
    /// True for failures that only mean "no history in that direction".
    pub fn is_empty_history(&self) -> bool {
        matches!(self, RenameError::NothingToUndo | RenameError::NothingToRedo)
    }
}

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("no API key configured")]
    NotConfigured,

    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model returned no usable filename")]
    EmptyResponse,
}
