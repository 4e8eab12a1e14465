//! Read-only book content: title plus ordered chapters of blocks.
//!
//! A book comes from a JSON file (markup or paragraph-array bodies), from a
//! plain-text canon (see [`canon`]), or from the bundled sample.

mod canon;
mod markup;

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ReaderError, Result};

pub use canon::import_canon;
pub use markup::parse_markup;

const SAMPLE_BOOK: &str = include_str!("../../assets/sample_book.json");

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Chapter {
    pub fn new(title: impl Into<String>, blocks: Vec<Block>) -> Self {
        Chapter { title: title.into(), blocks }
    }
}

#[cfg(test)]
impl Chapter {
    // Paragraph blocks in order; headings are skipped so indices stay stable
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(text) => Some(text.as_str()),
            Block::Heading { .. } => None,
        })
    }

    pub fn paragraph(&self, index: usize) -> Option<&str> {
        self.paragraphs().nth(index)
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    pub author: Option<String>,
    pub chapters: Vec<Chapter>,
}

// On-disk shape of a JSON book
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookFile {
    book_title: String,
    #[serde(default)]
    book_author: Option<String>,
    chapters: Vec<ChapterFile>,
}

#[derive(Deserialize)]
struct ChapterFile {
    title: String,
    content: ChapterBody,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChapterBody {
    Markup(String),
    Paragraphs(Vec<String>),
}

impl Book {
    pub fn new(title: impl Into<String>, chapters: Vec<Chapter>) -> Result<Self> {
        let title = title.into();
        if chapters.is_empty() {
            return Err(ReaderError::EmptyBook(title));
        }
        Ok(Book { title, author: None, chapters })
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: BookFile = serde_json::from_str(json)?;
        let chapters = file
            .chapters
            .into_iter()
            .map(|c| {
                let blocks = match c.content {
                    ChapterBody::Markup(markup) => parse_markup(&markup),
                    ChapterBody::Paragraphs(paras) => paras
                        .into_iter()
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .map(Block::Paragraph)
                        .collect(),
                };
                Chapter::new(c.title, blocks)
            })
            .collect();

        let mut book = Book::new(file.book_title, chapters)?;
        book.author = file.book_author;
        Ok(book)
    }

    // Pick the loader from the file extension
    pub fn load(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let book = match ext.as_deref() {
            Some("json") => {
                let json = fs::read_to_string(path).map_err(|e| ReaderError::io(path, e))?;
                Book::from_json_str(&json)?
            }
            Some("txt") => {
                let text = fs::read_to_string(path).map_err(|e| ReaderError::io(path, e))?;
                import_canon(&text)?
            }
            _ => return Err(ReaderError::UnsupportedBookFormat(path.to_path_buf())),
        };

        tracing::info!(
            path = %path.display(),
            chapters = book.chapter_count(),
            "loaded book \"{}\"",
            book.title
        );
        Ok(book)
    }

    pub fn sample() -> Result<Self> {
        Book::from_json_str(SAMPLE_BOOK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn paragraph_indices_skip_headings() {
        let chapter = Chapter::new(
            "A Scandal in Bohemia",
            vec![
                Block::Heading { level: 2, text: "A Scandal in Bohemia".into() },
                Block::Paragraph("To Sherlock Holmes she is always the woman.".into()),
                Block::Heading { level: 3, text: "II.".into() },
                Block::Paragraph("At three o'clock precisely I was at Baker Street.".into()),
            ],
        );
        assert_eq!(chapter.paragraph_count(), 2);
        assert_eq!(chapter.paragraph(1), Some("At three o'clock precisely I was at Baker Street."));
        assert_eq!(chapter.paragraph(2), None);
    }

    #[test]
    fn reads_markup_and_array_bodies() {
        let json = r#"{
            "bookTitle": "The Complete Sherlock Holmes",
            "bookAuthor": "Arthur Conan Doyle",
            "chapters": [
                { "title": "One", "content": "<h2>One</h2>\n<p>First &amp; foremost.</p>" },
                { "title": "Two", "content": ["Alpha", "  ", "Beta"] }
            ]
        }"#;
        let book = Book::from_json_str(json).unwrap();
        assert_eq!(book.author.as_deref(), Some("Arthur Conan Doyle"));
        assert_eq!(book.chapter_count(), 2);
        assert_eq!(book.chapters[0].paragraph(0), Some("First & foremost."));
        assert_eq!(book.chapters[1].paragraphs().collect::<Vec<_>>(), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn rejects_a_book_without_chapters() {
        let err = Book::from_json_str(r#"{ "bookTitle": "Nothing", "chapters": [] }"#).unwrap_err();
        assert!(matches!(err, ReaderError::EmptyBook(_)));
    }

    #[test]
    fn load_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("book.json");
        let mut f = fs::File::create(&json_path).unwrap();
        write!(f, r#"{{ "bookTitle": "T", "chapters": [{{ "title": "C", "content": "<p>x</p>" }}] }}"#).unwrap();
        assert_eq!(Book::load(&json_path).unwrap().title, "T");

        let epub_path = dir.path().join("book.epub");
        fs::write(&epub_path, b"").unwrap();
        assert!(matches!(Book::load(&epub_path), Err(ReaderError::UnsupportedBookFormat(_))));

        let missing = dir.path().join("missing.json");
        assert!(matches!(Book::load(&missing), Err(ReaderError::Io { .. })));
    }

    #[test]
    fn bundled_sample_loads() {
        let book = Book::sample().unwrap();
        assert!(book.chapter_count() >= 3);
        assert!(book.chapters.iter().all(|c| c.paragraph_count() > 0));
    }
}
