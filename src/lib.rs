//! Regex-driven batch renaming with previews, conflict detection and
//! undo/redo, plus an optional AI name suggester and a terminal UI.

pub mod cli;
pub mod config;
pub mod error;
pub mod headless;
pub mod logging;
pub mod rename_engine;
pub mod substitution;
pub mod suggest;
pub mod tui;

pub use config::LogLevel;
pub use error::{RenameError, SuggestError};
pub use rename_engine::{
    BatchKind, BatchSummary, EntryId, Preview, PreviewItem, PreviewStatus, RenameEngine,
};
