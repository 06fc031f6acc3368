use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Whether anything, including a dangling symlink, sits at `path`.
pub fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Stable identifier of a tracked entry. Never reused within one registry,
/// and unaffected by renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub id: EntryId,
    pub path: PathBuf,
    pub is_dir: bool,
    pub override_name: Option<String>,
}

impl Entry {
    /// The override, if one is set and non-empty.
    pub fn effective_override(&self) -> Option<&str> {
        self.override_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Entries keyed by id, with a path-sorted view for iteration.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<EntryId, Entry>,
    order: Vec<EntryId>,
    next_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.entries.values().any(|e| e.path == path)
    }

    /// Drop every entry (ids are not recycled) and track the given paths.
    pub fn replace_all<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.entries.clear();
        self.order.clear();
        self.extend(paths);
    }

    /// Track every path that exists and is not tracked yet. Returns how many
    /// entries were created.
    pub fn extend<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut added = 0;
        for path in paths {
            let path = path.as_ref();
            if !occupied(path) {
                debug!(path = %path.display(), "Ignoring path that does not exist");
                continue;
            }
            if self.contains_path(path) {
                continue;
            }
            self.insert(path.to_path_buf());
            added += 1;
        }
        self.sort();
        added
    }

    fn insert(&mut self, path: PathBuf) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        let is_dir = path.is_dir();
        self.entries.insert(
            id,
            Entry {
                id,
                path,
                is_dir,
                override_name: None,
            },
        );
        self.order.push(id);
        id
    }

    /// Returns false when the id is unknown.
    pub fn set_override(&mut self, id: EntryId, name: Option<String>) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.override_name = name;
                true
            }
            None => false,
        }
    }

    /// Point an entry at a new location. Unknown ids are ignored.
    pub fn set_path(&mut self, id: EntryId, path: PathBuf) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.path = path;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        let removed = self.entries.remove(&id)?;
        self.order.retain(|other| *other != id);
        Some(removed)
    }

    /// Ids whose path no longer exists on disk.
    pub fn missing_ids(&self) -> Vec<EntryId> {
        self.iter()
            .filter(|e| !occupied(&e.path))
            .map(|e| e.id)
            .collect()
    }

    pub fn sort(&mut self) {
        let entries = &self.entries;
        self.order.sort_by(|a, b| entries[a].path.cmp(&entries[b].path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn extend_skips_missing_and_already_tracked_paths() {
        let dir = TempDir::new().unwrap();
        let b = dir.path().join("b.txt");
        let a = dir.path().join("a.txt");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();

        let mut registry = Registry::new();
        assert_eq!(registry.extend([&b, &dir.path().join("ghost.txt")]), 1);
        assert_eq!(registry.extend([&a, &b]), 1);

        let paths: Vec<_> = registry.iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, vec![a, b]);
    }

    #[test]
    fn ids_are_not_reused_after_replace_all() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        fs::write(&a, "a").unwrap();

        let mut registry = Registry::new();
        registry.extend([&a]);
        let first = registry.iter().next().unwrap().id;
        registry.replace_all([&a]);
        let second = registry.iter().next().unwrap().id;

        assert_ne!(first, second);
        assert!(registry.get(first).is_none());
    }

    #[test]
    fn directories_are_classified_at_registration() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("photos");
        fs::create_dir(&sub).unwrap();

        let mut registry = Registry::new();
        registry.extend([&sub]);
        assert!(registry.iter().next().unwrap().is_dir);
    }

    #[test]
    fn empty_override_is_not_effective() {
        let entry = Entry {
            id: EntryId(0),
            path: PathBuf::from("a.txt"),
            is_dir: false,
            override_name: Some(String::new()),
        };
        assert_eq!(entry.effective_override(), None);
    }
}
