//! Durable bookmark set, keyed by episode id.
//!
//! Stored as a JSON array of id strings in a single file, read once at
//! startup and rewritten on every change. Ids are not checked against the
//! currently fetched episodes; a bookmark can outlive its episode.

use crate::error::AppError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name under the data directory. Mirrors the site's old storage key
/// (`thought-bookmarks`).
const BOOKMARKS_FILE: &str = "thought-bookmarks.json";

pub struct BookmarkStore {
    path: PathBuf,
    ids: Mutex<HashSet<String>>,
}

impl BookmarkStore {
    /// Open the store inside `data_dir`, creating the directory if needed.
    /// A corrupt or unreadable file is logged and treated as an empty set.
    pub fn open(data_dir: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(BOOKMARKS_FILE);

        let ids = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(list) => list.into_iter().collect(),
                Err(e) => {
                    tracing::warn!("Corrupt bookmark file {:?}: {}; starting empty", path, e);
                    HashSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                tracing::warn!("Could not read bookmark file {:?}: {}; starting empty", path, e);
                HashSet::new()
            }
        };

        Ok(Self {
            path,
            ids: Mutex::new(ids),
        })
    }

    /// Flip membership for `id` and persist. Returns the new membership,
    /// so double-toggling restores the original state.
    pub fn toggle(&self, id: &str) -> Result<bool, AppError> {
        let mut ids = self.ids.lock().unwrap();
        let bookmarked = if ids.remove(id) {
            false
        } else {
            ids.insert(id.to_string());
            true
        };
        self.persist(&ids)?;
        Ok(bookmarked)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.lock().unwrap().contains(id)
    }

    /// Snapshot of all bookmarked ids, sorted for stable output.
    pub fn ids(&self) -> Vec<String> {
        let mut list: Vec<String> = self.ids.lock().unwrap().iter().cloned().collect();
        list.sort();
        list
    }

    fn persist(&self, ids: &HashSet<String>) -> Result<(), AppError> {
        let mut list: Vec<&String> = ids.iter().collect();
        list.sort();
        let json = serde_json::to_string(&list)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_store() -> (BookmarkStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = BookmarkStore::open(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let (store, _temp) = setup_store();
        assert!(store.toggle("ep-1").unwrap());
        assert!(store.contains("ep-1"));
        assert!(!store.toggle("ep-1").unwrap());
        assert!(!store.contains("ep-1"));
    }

    #[test]
    fn test_double_toggle_restores_membership() {
        let (store, _temp) = setup_store();
        store.toggle("keep").unwrap();

        let before = store.ids();
        store.toggle("ep-2").unwrap();
        store.toggle("ep-2").unwrap();
        assert_eq!(store.ids(), before);
    }

    #[test]
    fn test_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = BookmarkStore::open(temp_dir.path()).unwrap();
            store.toggle("a").unwrap();
            store.toggle("b").unwrap();
        }
        let store = BookmarkStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(BOOKMARKS_FILE), "{not json[").unwrap();

        let store = BookmarkStore::open(temp_dir.path()).unwrap();
        assert!(store.ids().is_empty());
        // And it recovers: the next toggle rewrites a clean file
        store.toggle("fresh").unwrap();
        let store = BookmarkStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.ids(), vec!["fresh".to_string()]);
    }

    #[test]
    fn test_missing_file_is_empty_set() {
        let (store, _temp) = setup_store();
        assert!(store.ids().is_empty());
        assert!(!store.contains("anything"));
    }
}
