//! Paragraph bookmarks and the manager that owns the list.
//!
//! Bookmarks are versioned. Version 1 records carry the chapter and
//! paragraph they point at. Version 0 records come from the old
//! document-wide `para-{n}` scheme and cannot be resolved to a chapter.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::paragraph_id::{ParagraphId, ParagraphRef};
use crate::store::BookmarkStore;

pub const CURRENT_VERSION: u32 = 1;
pub const LEGACY_VERSION: u32 = 0;

// Characters of paragraph text kept in a bookmark label
pub const DEFAULT_SNIPPET_CHARS: usize = 25;

const ELLIPSIS: &str = "...";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredBookmark", into = "StoredBookmark")]
pub struct Bookmark {
    id: String,
    label: String,
    timestamp: i64, // ms since the Unix epoch
    version: u32,
    location: Option<ParagraphRef>,
}

// Wire shape; a superset of the legacy {id, label, timestamp} record
#[derive(Clone, Serialize, Deserialize)]
struct StoredBookmark {
    id: String,
    label: String,
    timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chapter: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    paragraph: Option<usize>,
}

impl From<StoredBookmark> for Bookmark {
    fn from(stored: StoredBookmark) -> Self {
        let (version, location) = match stored.version {
            Some(version) => {
                let location = match (stored.chapter, stored.paragraph) {
                    (Some(chapter), Some(paragraph)) => Some(ParagraphRef::new(chapter, paragraph)),
                    _ => None,
                };
                (version, location)
            }
            // Unversioned record: classify once by id shape
            None => match ParagraphId::parse(&stored.id) {
                ParagraphId::Current(at) => (CURRENT_VERSION, Some(at)),
                ParagraphId::Legacy(n) => {
                    tracing::debug!("bookmark {} uses document-wide index {}", stored.id, n);
                    (LEGACY_VERSION, None)
                }
                ParagraphId::Unknown => (LEGACY_VERSION, None),
            },
        };

        Bookmark {
            id: stored.id,
            label: stored.label,
            timestamp: stored.timestamp,
            version,
            location,
        }
    }
}

impl From<Bookmark> for StoredBookmark {
    fn from(bookmark: Bookmark) -> Self {
        StoredBookmark {
            id: bookmark.id,
            label: bookmark.label,
            timestamp: bookmark.timestamp,
            version: Some(bookmark.version),
            chapter: bookmark.location.map(|at| at.chapter),
            paragraph: bookmark.location.map(|at| at.paragraph),
        }
    }
}

impl Bookmark {
    pub fn new(at: ParagraphRef, label: impl Into<String>, timestamp: i64) -> Self {
        Bookmark {
            id: at.id(),
            label: label.into(),
            timestamp,
            version: CURRENT_VERSION,
            location: Some(at),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Where the bookmark points, if its schema version can say.
    pub fn location(&self) -> Option<ParagraphRef> {
        self.location
    }

    pub fn created_at(&self) -> Option<DateTime<Local>> {
        Utc.timestamp_millis_opt(self.timestamp)
            .single()
            .map(|t| t.with_timezone(&Local))
    }
}

// "{chapter title}: {first n chars}..."
pub fn bookmark_label(chapter_title: &str, paragraph_text: &str, snippet_chars: usize) -> String {
    let snippet: String = paragraph_text.trim().chars().take(snippet_chars).collect();
    format!("{}: {}{}", chapter_title, snippet.trim_end(), ELLIPSIS)
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub struct BookmarkManager {
    bookmarks: Vec<Bookmark>,
    store: BookmarkStore,
    snippet_chars: usize,
    clock: fn() -> i64,
}

impl BookmarkManager {
    // Loads whatever the store holds; bad data comes back as an empty list
    pub fn open(store: BookmarkStore, snippet_chars: usize) -> Self {
        let bookmarks = store.load();
        BookmarkManager { bookmarks, store, snippet_chars, clock: now_millis }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn list(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bookmarks.iter().any(|b| b.id == id)
    }

    /// Bookmark a paragraph. Returns `Ok(false)` when the paragraph is
    /// already bookmarked. On a store error the bookmark stays in memory.
    pub fn add(&mut self, at: ParagraphRef, chapter_title: &str, paragraph_text: &str) -> Result<bool> {
        let id = at.id();
        if self.contains(&id) {
            tracing::debug!("{} is already bookmarked", id);
            return Ok(false);
        }

        let label = bookmark_label(chapter_title, paragraph_text, self.snippet_chars);
        self.bookmarks.push(Bookmark::new(at, label, (self.clock)()));
        tracing::info!("bookmarked {}", id);

        self.persist()?;
        Ok(true)
    }

    /// Remove by list position, as displayed. Out-of-range is a no-op.
    pub fn remove(&mut self, position: usize) -> Result<Option<Bookmark>> {
        if position >= self.bookmarks.len() {
            tracing::debug!("no bookmark at position {}", position);
            return Ok(None);
        }
        let removed = self.bookmarks.remove(position);
        tracing::info!("removed bookmark {}", removed.id);

        self.persist()?;
        Ok(Some(removed))
    }

    pub fn remove_by_id(&mut self, id: &str) -> Result<Option<Bookmark>> {
        match self.bookmarks.iter().position(|b| b.id == id) {
            Some(position) => self.remove(position),
            None => Ok(None),
        }
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(&self.bookmarks).map_err(|e| {
            tracing::error!("failed to save bookmarks: {}", e);
            e
        })
    }
}
