//! Paragraph identity scheme: (chapter, paragraph) <-> "ch-{c}-p-{p}"

use std::fmt;

const CURRENT_PREFIX: &str = "ch-";
const CURRENT_INFIX: &str = "-p-";
const LEGACY_PREFIX: &str = "para-";

/// Position of a bookmarkable paragraph inside the book.
///
/// `paragraph` counts paragraph blocks only; headings do not shift it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParagraphRef {
    pub chapter: usize,
    pub paragraph: usize,
}

impl ParagraphRef {
    pub fn new(chapter: usize, paragraph: usize) -> Self {
        ParagraphRef { chapter, paragraph }
    }

    pub fn id(&self) -> String {
        paragraph_id(self.chapter, self.paragraph)
    }
}

impl fmt::Display for ParagraphRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", CURRENT_PREFIX, self.chapter, CURRENT_INFIX, self.paragraph)
    }
}

pub fn paragraph_id(chapter: usize, paragraph: usize) -> String {
    ParagraphRef::new(chapter, paragraph).to_string()
}

// Shape classification of a stored id. Only used when migrating records
// that predate the versioned bookmark format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParagraphId {
    Current(ParagraphRef),
    Legacy(usize), // para-{n}: document-wide index, chapter unknown
    Unknown,
}

impl ParagraphId {
    pub fn parse(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix(CURRENT_PREFIX) {
            if let Some((chapter, paragraph)) = rest.split_once(CURRENT_INFIX) {
                if let (Some(chapter), Some(paragraph)) = (parse_index(chapter), parse_index(paragraph)) {
                    return ParagraphId::Current(ParagraphRef::new(chapter, paragraph));
                }
            }
            return ParagraphId::Unknown;
        }

        match raw.strip_prefix(LEGACY_PREFIX).and_then(parse_index) {
            Some(n) => ParagraphId::Legacy(n),
            None => ParagraphId::Unknown,
        }
    }
}

// Plain decimal digits only: no sign, no whitespace
fn parse_index(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
