//! The renderer: a pure function from reader state to a `View`.
//!
//! A `View` is everything the screen shows and every entry the reader can
//! act on. It is rebuilt from scratch after each state change, and input is
//! always resolved against the most recent one, so list positions shown on
//! screen are the positions acted upon.

use chrono::{DateTime, Local};

use crate::book::{Block, Book};
use crate::bookmarks::Bookmark;
use crate::paragraph_id::ParagraphRef;

pub const APP_TITLE: &str = "Sherlock Holmes Reader";
pub const NO_BOOKMARKS: &str = "No bookmarks yet.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterEntry {
    pub index: usize,
    pub title: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookmarkEntry {
    pub position: usize, // index in the stored list
    pub id: String,
    pub label: String,
    pub created: Option<DateTime<Local>>,
    pub target: Option<ParagraphRef>, // None: old-format bookmark
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentBlock {
    Heading { level: u8, text: String },
    Paragraph { at: ParagraphRef, id: String, text: String, bookmarked: bool },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct View {
    pub page_title: String,
    pub book_title: String,
    pub book_author: Option<String>,
    pub chapter_index: usize,
    pub chapter_title: String,
    pub chapters: Vec<ChapterEntry>,
    pub bookmarks: Vec<BookmarkEntry>,
    pub content: Vec<ContentBlock>,
}

pub fn render(book: &Book, current: usize, bookmarks: &[Bookmark]) -> View {
    // Book::new guarantees at least one chapter
    let current = current.min(book.chapter_count().saturating_sub(1));
    let chapter = &book.chapters[current];

    let chapters = book
        .chapters
        .iter()
        .enumerate()
        .map(|(index, c)| ChapterEntry { index, title: c.title.clone(), active: index == current })
        .collect();

    let bookmark_entries = bookmarks
        .iter()
        .enumerate()
        .map(|(position, b)| BookmarkEntry {
            position,
            id: b.id().to_string(),
            label: b.label().to_string(),
            created: b.created_at(),
            target: b.location(),
        })
        .collect();

    // Tag every paragraph; headings are not counted
    let mut paragraph = 0;
    let content = chapter
        .blocks
        .iter()
        .map(|block| match block {
            Block::Heading { level, text } => ContentBlock::Heading { level: *level, text: text.clone() },
            Block::Paragraph(text) => {
                let at = ParagraphRef::new(current, paragraph);
                paragraph += 1;
                let id = at.id();
                let bookmarked = bookmarks.iter().any(|b| b.id() == id);
                ContentBlock::Paragraph { at, id, text: text.clone(), bookmarked }
            }
        })
        .collect();

    View {
        page_title: page_title(&chapter.title),
        book_title: book.title.clone(),
        book_author: book.author.clone(),
        chapter_index: current,
        chapter_title: chapter.title.clone(),
        chapters,
        bookmarks: bookmark_entries,
        content,
    }
}

impl BookmarkEntry {
    // One sidebar row: label, creation time, and a marker for old bookmarks
    pub fn row_text(&self) -> String {
        let mut row = self.label.clone();
        if let Some(created) = self.created {
            row.push_str(&format!("  ({})", created.format("%b %d %H:%M")));
        }
        if self.target.is_none() {
            row.push_str("  [old format]");
        }
        row
    }
}

pub fn page_title(chapter_title: &str) -> String {
    format!("{} | {}", chapter_title, APP_TITLE)
}

impl View {
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    // n-th paragraph of the current chapter: (content block index, ref, text)
    pub fn paragraph(&self, n: usize) -> Option<(usize, ParagraphRef, &str)> {
        self.paragraphs().nth(n)
    }

    // Locate a paragraph id among the rendered blocks: (block index, paragraph index)
    pub fn find_paragraph(&self, id: &str) -> Option<(usize, usize)> {
        self.content.iter().enumerate().find_map(|(block, b)| match b {
            ContentBlock::Paragraph { at, id: pid, .. } if pid == id => Some((block, at.paragraph)),
            _ => None,
        })
    }

    pub fn bookmark(&self, position: usize) -> Option<&BookmarkEntry> {
        self.bookmarks.get(position)
    }

    // Sidebar bookmark rows, or the placeholder when there are none
    pub fn bookmark_rows(&self) -> Vec<String> {
        if self.bookmarks.is_empty() {
            return vec![NO_BOOKMARKS.to_string()];
        }
        self.bookmarks.iter().map(BookmarkEntry::row_text).collect()
    }

    fn paragraphs(&self) -> impl Iterator<Item = (usize, ParagraphRef, &str)> {
        self.content.iter().enumerate().filter_map(|(block, b)| match b {
            ContentBlock::Paragraph { at, text, .. } => Some((block, *at, text.as_str())),
            ContentBlock::Heading { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Chapter;
    use std::collections::HashSet;

    fn book() -> Book {
        let chapter = |title: &str, paras: &[&str]| {
            let mut blocks = vec![Block::Heading { level: 2, text: title.to_string() }];
            blocks.extend(paras.iter().map(|p| Block::Paragraph(p.to_string())));
            Chapter::new(title, blocks)
        };
        Book::new(
            "The Complete Sherlock Holmes",
            vec![
                chapter("One", &["a", "b"]),
                chapter("Two", &["c", "d", "e"]),
                chapter("Three", &["f"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn renders_only_the_current_chapter() {
        let view = render(&book(), 1, &[]);
        assert_eq!(view.page_title, "Two | Sherlock Holmes Reader");
        assert_eq!(view.chapter_title, "Two");
        assert_eq!(view.paragraph_count(), 3);
        assert_eq!(view.chapters.iter().filter(|c| c.active).map(|c| c.index).collect::<Vec<_>>(), vec![1]);
        assert!(view.bookmarks.is_empty());
    }

    #[test]
    fn paragraph_ids_are_stable_and_unique() {
        let book = book();
        let mut seen = HashSet::new();
        for chapter in 0..book.chapter_count() {
            let first = render(&book, chapter, &[]);
            let again = render(&book, chapter, &[]);
            assert_eq!(first.content, again.content);
            for b in &first.content {
                if let ContentBlock::Paragraph { id, .. } = b {
                    assert!(seen.insert(id.clone()), "{id} rendered twice");
                }
            }
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn headings_do_not_shift_paragraph_ids() {
        let view = render(&book(), 1, &[]);
        assert_eq!(view.find_paragraph("ch-1-p-0"), Some((1, 0)));
        assert_eq!(view.find_paragraph("ch-1-p-2"), Some((3, 2)));
        assert_eq!(view.find_paragraph("ch-0-p-0"), None);
        assert_eq!(view.paragraph(2).map(|(_, at, text)| (at, text)), Some((ParagraphRef::new(1, 2), "e")));
    }

    #[test]
    fn bookmarks_are_listed_and_marked() {
        let marks = vec![
            Bookmark::new(ParagraphRef::new(1, 1), "Two: d...", 1),
            serde_json::from_str::<Bookmark>(r#"{"id":"para-3","label":"old","timestamp":2}"#).unwrap(),
        ];
        let view = render(&book(), 1, &marks);

        assert_eq!(view.bookmarks.len(), 2);
        assert_eq!(view.bookmark(0).unwrap().target, Some(ParagraphRef::new(1, 1)));
        assert_eq!(view.bookmark(1).unwrap().target, None);
        assert_eq!(view.bookmark(1).unwrap().position, 1);

        let marked: Vec<_> = view
            .content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Paragraph { id, bookmarked: true, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(marked, vec!["ch-1-p-1"]);

        let rows = view.bookmark_rows();
        assert!(rows[0].starts_with("Two: d..."));
        assert!(rows[1].ends_with("[old format]"));
    }

    #[test]
    fn empty_bookmark_list_shows_placeholder() {
        let view = render(&book(), 0, &[]);
        assert_eq!(view.bookmark_rows(), vec![NO_BOOKMARKS.to_string()]);
    }
}
