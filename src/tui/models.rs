use std::path::PathBuf;

use crate::rename_engine::EntryId;

/// Which widget receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Pattern,
    Replacement,
    List,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Pattern => Focus::Replacement,
            Focus::Replacement => Focus::List,
            Focus::List => Focus::Pattern,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Focus::Pattern => Focus::List,
            Focus::Replacement => Focus::Pattern,
            Focus::List => Focus::Replacement,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    /// Execute despite warnings?
    Confirm,
    ApiSettings,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiField {
    Endpoint,
    Key,
}

/// A finished suggestion request, handed back to the UI loop.
#[derive(Debug)]
pub struct SuggestionOutcome {
    pub id: EntryId,
    pub path: PathBuf,
    pub result: Result<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}
