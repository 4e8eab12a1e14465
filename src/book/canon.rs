//! Plain-text canon import.
//!
//! Story titles (upper-case lines from CANON_TITLES) open a new chapter.
//! Blank lines separate paragraphs; "CHAPTER I" / "PART II" / "IV." lines
//! become section headings. A leading section with less than
//! FRONT_MATTER_CHARS of text is treated as a table of contents and dropped.

use super::{Block, Book, Chapter};
use crate::error::Result;

const CANON_BOOK_TITLE: &str = "The Complete Sherlock Holmes";
const CANON_AUTHOR: &str = "Arthur Conan Doyle";
const FRONT_MATTER_TITLE: &str = "Introduction";
const FRONT_MATTER_CHARS: usize = 2000;
const MAX_SECTION_HEADING_LEN: usize = 100;

// (line as it appears in the canon, display title)
const CANON_TITLES: &[(&str, &str)] = &[
    ("A STUDY IN SCARLET", "A Study in Scarlet"),
    ("THE SIGN OF THE FOUR", "The Sign of Four"),
    ("A SCANDAL IN BOHEMIA", "A Scandal in Bohemia"),
    ("THE RED-HEADED LEAGUE", "The Red-Headed League"),
    ("A CASE OF IDENTITY", "A Case of Identity"),
    ("THE BOSCOMBE VALLEY MYSTERY", "The Boscombe Valley Mystery"),
    ("THE FIVE ORANGE PIPS", "The Five Orange Pips"),
    ("THE MAN WITH THE TWISTED LIP", "The Man with the Twisted Lip"),
    ("THE ADVENTURE OF THE BLUE CARBUNCLE", "The Adventure of the Blue Carbuncle"),
    ("THE ADVENTURE OF THE SPECKLED BAND", "The Adventure of the Speckled Band"),
    ("THE ADVENTURE OF THE ENGINEER'S THUMB", "The Adventure of the Engineer's Thumb"),
    ("THE ADVENTURE OF THE NOBLE BACHELOR", "The Adventure of the Noble Bachelor"),
    ("THE ADVENTURE OF THE BERYL CORONET", "The Adventure of the Beryl Coronet"),
    ("THE ADVENTURE OF THE COPPER BEECHES", "The Adventure of the Copper Beeches"),
    ("SILVER BLAZE", "Silver Blaze"),
    ("THE YELLOW FACE", "The Yellow Face"),
    ("THE STOCK-BROKER'S CLERK", "The Stock-Broker's Clerk"),
    ("THE \"GLORIA SCOTT\"", "The Gloria Scott"),
    ("THE MUSGRAVE RITUAL", "The Musgrave Ritual"),
    ("THE REIGATE SQUIRES", "The Reigate Squires"),
    ("THE CROOKED MAN", "The Crooked Man"),
    ("THE RESIDENT PATIENT", "The Resident Patient"),
    ("THE GREEK INTERPRETER", "The Greek Interpreter"),
    ("THE NAVAL TREATY", "The Naval Treaty"),
    ("THE FINAL PROBLEM", "The Final Problem"),
    ("THE ADVENTURE OF THE EMPTY HOUSE", "The Adventure of the Empty House"),
    ("THE ADVENTURE OF THE NORWOOD BUILDER", "The Adventure of the Norwood Builder"),
    ("THE ADVENTURE OF THE DANCING MEN", "The Adventure of the Dancing Men"),
    ("THE ADVENTURE OF THE SOLITARY CYCLIST", "The Adventure of the Solitary Cyclist"),
    ("THE ADVENTURE OF THE PRIORY SCHOOL", "The Adventure of the Priory School"),
    ("THE ADVENTURE OF BLACK PETER", "The Adventure of Black Peter"),
    ("THE ADVENTURE OF CHARLES AUGUSTUS MILVERTON", "The Adventure of Charles Augustus Milverton"),
    ("THE ADVENTURE OF THE SIX NAPOLEONS", "The Adventure of the Six Napoleons"),
    ("THE ADVENTURE OF THE THREE STUDENTS", "The Adventure of the Three Students"),
    ("THE ADVENTURE OF THE GOLDEN PINCE-NEZ", "The Adventure of the Golden Pince-Nez"),
    ("THE ADVENTURE OF THE MISSING THREE-QUARTER", "The Adventure of the Missing Three-Quarter"),
    ("THE ADVENTURE OF THE ABBEY GRANGE", "The Adventure of the Abbey Grange"),
    ("THE ADVENTURE OF THE SECOND STAIN", "The Adventure of the Second Stain"),
    ("THE HOUND OF THE BASKERVILLES", "The Hound of the Baskervilles"),
    ("THE VALLEY OF FEAR", "The Valley of Fear"),
    ("THE ADVENTURE OF WISTERIA LODGE", "The Adventure of Wisteria Lodge"),
    ("THE ADVENTURE OF THE CARDBOARD BOX", "The Adventure of the Cardboard Box"),
    ("THE ADVENTURE OF THE RED CIRCLE", "The Adventure of the Red Circle"),
    ("THE ADVENTURE OF THE BRUCE-PARTINGTON PLANS", "The Adventure of the Bruce-Partington Plans"),
    ("THE ADVENTURE OF THE DYING DETECTIVE", "The Adventure of the Dying Detective"),
    ("THE DISAPPEARANCE OF LADY FRANCES CARFAX", "The Disappearance of Lady Frances Carfax"),
    ("THE ADVENTURE OF THE DEVIL'S FOOT", "The Adventure of the Devil's Foot"),
    ("HIS LAST BOW", "His Last Bow"),
];

fn canon_title(line: &str) -> Option<&'static str> {
    CANON_TITLES
        .iter()
        .find(|(raw, _)| *raw == line)
        .map(|(_, title)| *title)
}

pub fn import_canon(text: &str) -> Result<Book> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut chapters = Vec::new();
    let mut builder = ChapterBuilder::new(FRONT_MATTER_TITLE);

    for line in text.lines() {
        let stripped = line.trim();
        if let Some(title) = canon_title(stripped) {
            tracing::debug!("canon: found \"{}\"", title);
            let finished = std::mem::replace(&mut builder, ChapterBuilder::new(title));
            if let Some(chapter) = finished.finish() {
                chapters.push(chapter);
            }
            builder.blocks.push(Block::Heading { level: 2, text: title.to_string() });
        } else {
            builder.push_line(stripped);
        }
    }
    if let Some(chapter) = builder.finish() {
        chapters.push(chapter);
    }

    // Skip a short table-of-contents section before the first story
    if chapters.len() > 1 && text_len(&chapters[0]) < FRONT_MATTER_CHARS {
        tracing::info!("canon: skipping short front matter \"{}\"", chapters[0].title);
        chapters.remove(0);
    }

    let mut book = Book::new(CANON_BOOK_TITLE, chapters)?;
    book.author = Some(CANON_AUTHOR.to_string());
    Ok(book)
}

struct ChapterBuilder {
    title: String,
    blocks: Vec<Block>,
    current: Vec<String>, // lines of the paragraph being collected
}

impl ChapterBuilder {
    fn new(title: &str) -> Self {
        ChapterBuilder { title: title.to_string(), blocks: Vec::new(), current: Vec::new() }
    }

    fn push_line(&mut self, stripped: &str) {
        if stripped.is_empty() {
            self.end_paragraph();
        } else {
            self.current.push(stripped.to_string());
        }
    }

    fn end_paragraph(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let text = self.current.join(" ");
        self.current.clear();

        if is_section_heading(&text) {
            self.blocks.push(Block::Heading { level: 3, text });
        } else {
            self.blocks.push(Block::Paragraph(text));
        }
    }

    fn finish(mut self) -> Option<Chapter> {
        self.end_paragraph();
        if self.blocks.is_empty() {
            return None;
        }
        Some(Chapter::new(self.title, self.blocks))
    }
}

fn text_len(chapter: &Chapter) -> usize {
    chapter
        .blocks
        .iter()
        .map(|b| match b {
            Block::Heading { text, .. } | Block::Paragraph(text) => text.len(),
        })
        .sum()
}

// "CHAPTER IV", "PART II", "XII", "XII." (case-insensitive)
fn is_section_heading(text: &str) -> bool {
    if text.len() >= MAX_SECTION_HEADING_LEN {
        return false;
    }
    let upper = text.to_ascii_uppercase();
    let numeral = upper
        .strip_prefix("CHAPTER ")
        .or_else(|| upper.strip_prefix("PART "))
        .unwrap_or_else(|| upper.strip_suffix('.').unwrap_or(&upper));

    let is_roman = |s: &str| !s.is_empty() && s.chars().all(|c| matches!(c, 'I' | 'V' | 'X' | 'L' | 'C'));
    is_roman(numeral)
}
