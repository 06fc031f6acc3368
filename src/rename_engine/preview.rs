//! Candidate-name computation and collision classification.
//!
//! Nothing here touches the disk except for existence checks; the caller
//! inspects the result before anything is renamed.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::registry::{Entry, EntryId, Registry, occupied};
use crate::error::RenameError;
use crate::substitution::translate_replacement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    Ok,
    /// The candidate path already exists on disk.
    Conflict,
    /// Another item of the same preview computes the same candidate path.
    Duplicate,
}

impl PreviewStatus {
    pub fn is_warning(self) -> bool {
        self != PreviewStatus::Ok
    }
}

impl fmt::Display for PreviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PreviewStatus::Ok => "ok",
            PreviewStatus::Conflict => "conflict",
            PreviewStatus::Duplicate => "duplicate",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewItem {
    pub id: EntryId,
    pub original_name: String,
    pub new_name: String,
    pub old_full_path: PathBuf,
    pub new_full_path: PathBuf,
    pub status: PreviewStatus,
    pub is_dir: bool,
    pub is_overridden: bool,
}

impl PreviewItem {
    /// Whether executing this item would rename anything.
    pub fn is_actionable(&self) -> bool {
        self.original_name != self.new_name && self.status == PreviewStatus::Ok
    }
}

#[derive(Debug, Clone, Default)]
pub struct Preview {
    pub items: Vec<PreviewItem>,
    /// Any item is a conflict or a duplicate.
    pub has_warning: bool,
}

impl Preview {
    pub fn actionable(&self) -> usize {
        self.items.iter().filter(|i| i.is_actionable()).count()
    }
}

/// Where an item's new name comes from, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSource<'a> {
    Override(&'a str),
    Pattern(String),
    Unchanged,
}

/// A compiled pattern together with its translated replacement.
pub struct Substitution {
    regex: Regex,
    replacement: String,
}

impl Substitution {
    pub fn compile(pattern: &str, replacement: &str) -> Result<Self, RenameError> {
        let regex = Regex::new(pattern).map_err(|source| RenameError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            regex,
            replacement: translate_replacement(replacement),
        })
    }

    pub fn apply(&self, name: &str) -> String {
        self.regex
            .replace_all(name, self.replacement.as_str())
            .into_owned()
    }
}

/// Override beats pattern, pattern beats leaving the name alone.
pub fn resolve_name<'a>(
    override_name: Option<&'a str>,
    substitution: Option<&Substitution>,
    original_name: &str,
) -> NameSource<'a> {
    match (override_name.filter(|n| !n.is_empty()), substitution) {
        (Some(name), _) => NameSource::Override(name),
        (None, Some(sub)) => NameSource::Pattern(sub.apply(original_name)),
        (None, None) => NameSource::Unchanged,
    }
}

/// Compute the preview for every entry in registry order.
///
/// An empty pattern means "no substitution". An invalid pattern only fails
/// the call when some entry would actually need it, i.e. lacks an override.
pub fn build_preview(
    registry: &Registry,
    pattern: &str,
    replacement: &str,
) -> Result<Preview, RenameError> {
    let substitution = if pattern.is_empty() {
        None
    } else {
        match Substitution::compile(pattern, replacement) {
            Ok(sub) => Some(sub),
            Err(err) => {
                if registry.iter().all(|e| e.effective_override().is_some()) {
                    debug!(%err, "Ignoring invalid pattern; every entry is overridden");
                    None
                } else {
                    return Err(err);
                }
            }
        }
    };

    let mut items: Vec<PreviewItem> = Vec::with_capacity(registry.len());
    let mut first_seen: HashMap<PathBuf, usize> = HashMap::new();
    let mut has_warning = false;

    for entry in registry.iter() {
        let mut item = preview_entry(entry, substitution.as_ref());

        if let Some(&first) = first_seen.get(&item.new_full_path) {
            item.status = PreviewStatus::Duplicate;
            items[first].status = PreviewStatus::Duplicate;
        } else {
            first_seen.insert(item.new_full_path.clone(), items.len());
        }

        has_warning |= item.status.is_warning();
        items.push(item);
    }

    Ok(Preview { items, has_warning })
}

fn preview_entry(entry: &Entry, substitution: Option<&Substitution>) -> PreviewItem {
    let original_name = file_name_of(&entry.path);
    let source = resolve_name(entry.effective_override(), substitution, &original_name);
    let is_overridden = matches!(source, NameSource::Override(_));
    let new_name = match source {
        NameSource::Override(name) => name.to_string(),
        NameSource::Pattern(name) => name,
        NameSource::Unchanged => original_name.clone(),
    };

    let new_full_path = parent_of(&entry.path).join(&new_name);
    let status = if new_full_path != entry.path && occupied(&new_full_path) {
        PreviewStatus::Conflict
    } else {
        PreviewStatus::Ok
    };

    PreviewItem {
        id: entry.id,
        original_name,
        new_name,
        old_full_path: entry.path.clone(),
        new_full_path,
        status,
        is_dir: entry.is_dir,
        is_overridden,
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_pattern() {
        let sub = Substitution::compile(r"(.*)\.txt", "$1_v2.txt").unwrap();
        assert_eq!(
            resolve_name(Some("photo.jpg"), Some(&sub), "a.txt"),
            NameSource::Override("photo.jpg")
        );
    }

    #[test]
    fn empty_override_falls_through_to_pattern() {
        let sub = Substitution::compile(r"(.*)\.txt", "$1_v2.txt").unwrap();
        assert_eq!(
            resolve_name(Some(""), Some(&sub), "a.txt"),
            NameSource::Pattern("a_v2.txt".to_string())
        );
    }

    #[test]
    fn no_pattern_and_no_override_leaves_name() {
        assert_eq!(resolve_name(None, None, "a.txt"), NameSource::Unchanged);
    }

    #[test]
    fn substitution_replaces_every_match() {
        let sub = Substitution::compile(" ", "_").unwrap();
        assert_eq!(sub.apply("my holiday photo.jpg"), "my_holiday_photo.jpg");
    }

    #[test]
    fn invalid_pattern_reports_pattern_error() {
        let err = Substitution::compile("(unclosed", "").err().unwrap();
        assert!(matches!(err, RenameError::Pattern { .. }));
    }
}
