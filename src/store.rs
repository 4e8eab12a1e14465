//! Durable key-value storage for reader state.
//!
//! FileStore keeps one JSON document per key under a directory, the way a
//! browser keeps localStorage entries per origin.

use std::fs;
use std::path::PathBuf;

use crate::bookmarks::Bookmark;
use crate::error::{ReaderError, Result};

/// Storage key of the persisted bookmark list
pub const BOOKMARKS_KEY: &str = "sherlock-bookmarks";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| ReaderError::io(path, e))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| ReaderError::io(&self.dir, e))?;
        }

        // Write-then-rename so a crash never leaves a half-written list
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| ReaderError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| ReaderError::io(&path, e))?;
        Ok(())
    }
}

// In-memory backend for tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    entries: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The bookmark list's view of a key-value backend.
pub struct BookmarkStore {
    backend: Box<dyn KeyValueStore>,
}

impl BookmarkStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        BookmarkStore { backend }
    }

    // Missing or unreadable state is an empty list, never an error
    pub fn load(&self) -> Vec<Bookmark> {
        let raw = match self.backend.get(BOOKMARKS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("could not read stored bookmarks: {}", e);
                return Vec::new();
            }
        };

        let records = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("discarding malformed bookmark data: {}", e);
                return Vec::new();
            }
        };

        // One bad record costs only itself
        let bookmarks: Vec<Bookmark> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(bookmark) => Some(bookmark),
                Err(e) => {
                    tracing::warn!("skipping stored bookmark #{}: {}", index, e);
                    None
                }
            })
            .collect();
        tracing::info!(count = bookmarks.len(), "loaded bookmarks");
        bookmarks
    }

    pub fn save(&mut self, bookmarks: &[Bookmark]) -> Result<()> {
        let json = serde_json::to_string(bookmarks)?;
        self.backend.set(BOOKMARKS_KEY, &json)?;
        tracing::debug!(count = bookmarks.len(), "saved bookmarks");
        Ok(())
    }

    #[cfg(test)]
    pub fn raw(&self) -> Option<String> {
        self.backend.get(BOOKMARKS_KEY).ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paragraph_id::ParagraphRef;

    fn store_with(raw: &str) -> BookmarkStore {
        let mut backend = MemoryStore::default();
        backend.set(BOOKMARKS_KEY, raw).unwrap();
        BookmarkStore::new(Box::new(backend))
    }

    #[test]
    fn missing_key_is_empty() {
        let store = BookmarkStore::new(Box::new(MemoryStore::default()));
        assert!(store.load().is_empty());
    }

    #[test]
    fn malformed_json_is_empty() {
        assert!(store_with("{not json").load().is_empty());
        assert!(store_with("null").load().is_empty());
    }

    #[test]
    fn bad_record_does_not_drop_the_others() {
        let store = store_with(
            r#"[{"id":"ch-0-p-0","label":"One: a...","timestamp":1},
                {"id":"ch-0-p-1","label":"One: b...","timestamp":2},
                {"id":"ch-0-p-2","label":"One: c..."},
                "not a record"]"#,
        );
        let loaded = store.load();
        assert_eq!(loaded.iter().map(Bookmark::id).collect::<Vec<_>>(), vec!["ch-0-p-0", "ch-0-p-1"]);
    }

    #[test]
    fn round_trip_preserves_order_and_fields() {
        let original = vec![
            Bookmark::new(ParagraphRef::new(2, 1), "The Red-Headed League: I had called upon my fr...", 1_700_000_000_123),
            Bookmark::new(ParagraphRef::new(0, 0), "A Scandal in Bohemia: To Sherlock Holmes she i...", 1_700_000_000_001),
        ];

        let dir = tempfile::tempdir().unwrap();
        let mut store = BookmarkStore::new(Box::new(FileStore::new(dir.path())));
        store.save(&original).unwrap();

        let reopened = BookmarkStore::new(Box::new(FileStore::new(dir.path())));
        assert_eq!(reopened.load(), original);
    }

    #[test]
    fn reads_records_without_version() {
        let store = store_with(
            r##"[{"id":"para-3","label":"#4 (It was...)","timestamp":1690000000000},
                {"id":"ch-1-p-0","label":"Two: x...","timestamp":1690000000001}]"##,
        );
        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].location(), None);
        assert_eq!(loaded[1].location(), Some(ParagraphRef::new(1, 0)));
    }

    #[test]
    fn file_store_creates_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut store = FileStore::new(&nested);
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "[]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[]"));
        assert!(nested.join("k.json").exists());
        assert!(!nested.join("k.json.tmp").exists());
    }
}
