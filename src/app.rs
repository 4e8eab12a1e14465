//! Reader controller: owns all state and is the only place it changes.
//!
//! Every mutation goes through a method here, and every method that changes
//! what is on screen ends by rebuilding the View. Input handlers only see
//! positions from that View.

use std::time::{Duration, Instant};

use crate::book::Book;
use crate::bookmarks::BookmarkManager;
use crate::highlight::Highlighter;
use crate::navigation::{Navigator, SessionHistory, Transition};
use crate::paragraph_id::ParagraphRef;
use crate::view::{self, View};

pub const LEGACY_NOTICE: &str = "This bookmark is from an old format and cannot be opened.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Chapters,
    Bookmarks,
    Content,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Chapters => Focus::Bookmarks,
            Focus::Bookmarks => Focus::Content,
            Focus::Content => Focus::Chapters,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Focus::Chapters => Focus::Content,
            Focus::Bookmarks => Focus::Chapters,
            Focus::Content => Focus::Bookmarks,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dialog {
    None,
    Notice(String),
    GoTo(String), // fragment being typed
    Help,
}

// How the content pane should scroll on the next draw
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollRequest {
    Keep,
    Top,
    Center(usize), // content block index
    Follow,        // keep the selected paragraph visible
}

pub struct App {
    book: Book,
    navigator: Navigator,
    history: SessionHistory,
    bookmarks: BookmarkManager,
    highlighter: Highlighter,
    view: View,
    renders: u64,
    pending_reveal: Option<ParagraphRef>,
    pub focus: Focus,
    pub chapter_cursor: usize,
    pub bookmark_cursor: usize,
    pub paragraph_cursor: usize,
    pub scroll: usize, // line offset into the content pane
    pub scroll_request: ScrollRequest,
    pub dialog: Dialog,
    pub message: String,
    pub should_quit: bool,
}

impl App {
    pub fn new(book: Book, bookmarks: BookmarkManager, startup_fragment: Option<&str>, highlight: Duration) -> Self {
        let history = SessionHistory::new(startup_fragment);
        let navigator = Navigator::new(book.chapter_count(), startup_fragment);
        let view = view::render(&book, navigator.current(), bookmarks.list());
        let chapter_cursor = navigator.current();

        tracing::info!(
            chapter = navigator.current(),
            bookmarks = bookmarks.len(),
            "reader started on \"{}\"",
            book.title
        );

        App {
            book,
            navigator,
            history,
            bookmarks,
            highlighter: Highlighter::new(highlight),
            view,
            renders: 1,
            pending_reveal: None,
            focus: Focus::Content,
            chapter_cursor,
            bookmark_cursor: 0,
            paragraph_cursor: 0,
            scroll: 0,
            scroll_request: ScrollRequest::Top,
            dialog: Dialog::None,
            message: String::from("Welcome! Press F1 for help."),
            should_quit: false,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn current_chapter(&self) -> usize {
        self.navigator.current()
    }

    pub fn chapter_count(&self) -> usize {
        self.navigator.chapter_count()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.history.current()
    }

    pub fn bookmarks(&self) -> &BookmarkManager {
        &self.bookmarks
    }

    pub fn is_highlighted(&self, paragraph_id: &str) -> bool {
        self.highlighter.is_lit(paragraph_id)
    }

    #[cfg(test)]
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    // Full rebuild; nothing from the previous View survives
    fn render(&mut self) {
        self.view = view::render(&self.book, self.navigator.current(), self.bookmarks.list());
        self.renders += 1;
        tracing::trace!(renders = self.renders, "view rebuilt");

        self.chapter_cursor = self.chapter_cursor.min(self.view.chapters.len().saturating_sub(1));
        self.bookmark_cursor = self.bookmark_cursor.min(self.view.bookmarks.len().saturating_sub(1));
        self.paragraph_cursor = self.paragraph_cursor.min(self.view.paragraph_count().saturating_sub(1));
    }

    fn apply(&mut self, transition: Transition) {
        if let Transition::Switched { from, to } = transition {
            tracing::debug!("chapter {} -> {}", from, to);
            self.paragraph_cursor = 0;
            self.chapter_cursor = to;
            self.render();
            self.scroll_request = ScrollRequest::Top;
            self.message = format!("Chapter {}: {}", to + 1, self.view.chapter_title);
        }
    }

    // --- Navigation ---

    pub fn select_chapter(&mut self, index: usize) {
        let transition = self.navigator.select_chapter(index, &mut self.history);
        self.apply(transition);
    }

    pub fn next_chapter(&mut self) {
        let transition = self.navigator.next(&mut self.history);
        self.apply(transition);
    }

    pub fn previous_chapter(&mut self) {
        let transition = self.navigator.previous(&mut self.history);
        self.apply(transition);
    }

    // The location changed from outside (history step or typed fragment)
    pub fn fragment_changed(&mut self, raw: &str) {
        let transition = self.navigator.fragment_changed(raw);
        self.apply(transition);
    }

    pub fn history_back(&mut self) {
        match self.history.back().map(str::to_string) {
            Some(fragment) => self.fragment_changed(&fragment),
            None => self.message = "No earlier location.".to_string(),
        }
    }

    pub fn history_forward(&mut self) {
        match self.history.forward().map(str::to_string) {
            Some(fragment) => self.fragment_changed(&fragment),
            None => self.message = "No later location.".to_string(),
        }
    }

    // Typed location: recorded as-is, then followed like any external change
    pub fn go_to(&mut self, raw: &str) {
        let raw = raw.trim();
        if raw.is_empty() {
            return;
        }
        self.history.push(raw);
        self.fragment_changed(raw);
    }

    // --- Bookmarks ---

    pub fn add_bookmark(&mut self, paragraph: usize) {
        let Some((_, at, text)) = self.view.paragraph(paragraph) else {
            return;
        };
        let text = text.to_string();
        let chapter_title = self.view.chapter_title.clone();

        match self.bookmarks.add(at, &chapter_title, &text) {
            Ok(true) => {
                self.render();
                self.message = format!("Bookmarked paragraph {} of \"{}\".", at.paragraph + 1, chapter_title);
            }
            Ok(false) => self.message = "Paragraph is already bookmarked.".to_string(),
            Err(e) => {
                self.render();
                self.message = format!("Bookmark added but not saved: {}", e);
            }
        }
    }

    // `position` is a row of the bookmark list currently on screen
    pub fn remove_bookmark(&mut self, position: usize) {
        let Some(entry) = self.view.bookmark(position) else {
            return;
        };
        match self.bookmarks.remove(entry.position) {
            Ok(Some(removed)) => {
                self.render();
                self.message = format!("Removed bookmark \"{}\".", removed.label());
            }
            Ok(None) => {}
            Err(e) => {
                self.render();
                self.message = format!("Bookmark removed but not saved: {}", e);
            }
        }
    }

    // Content pane shortcut: drop the bookmark on the n-th paragraph, if any
    pub fn unbookmark_paragraph(&mut self, paragraph: usize) {
        let Some((_, at, _)) = self.view.paragraph(paragraph) else {
            return;
        };
        match self.bookmarks.remove_by_id(&at.id()) {
            Ok(Some(_)) => {
                self.render();
                self.message = format!("Removed bookmark on paragraph {}.", at.paragraph + 1);
            }
            Ok(None) => self.message = "Paragraph is not bookmarked.".to_string(),
            Err(e) => {
                self.render();
                self.message = format!("Bookmark removed but not saved: {}", e);
            }
        }
    }

    pub fn open_bookmark(&mut self, position: usize, now: Instant) {
        let Some(entry) = self.view.bookmark(position).cloned() else {
            return;
        };

        let Some(target) = entry.target else {
            tracing::info!("bookmark {} uses the old id format", entry.id);
            self.dialog = Dialog::Notice(LEGACY_NOTICE.to_string());
            return;
        };

        let transition = self.navigator.select_chapter(target.chapter, &mut self.history);
        self.apply(transition);

        // Looked up only after the view for the target chapter exists
        self.pending_reveal = Some(target);
        self.reveal_pending(now);
    }

    fn reveal_pending(&mut self, now: Instant) {
        let Some(target) = self.pending_reveal.take() else {
            return;
        };
        let id = target.id();

        match self.view.find_paragraph(&id) {
            Some((block, paragraph)) => {
                self.paragraph_cursor = paragraph;
                self.scroll_request = ScrollRequest::Center(block);
                self.highlighter.flash(&id, now);
                self.focus = Focus::Content;
            }
            None => {
                tracing::warn!(
                    "bookmark target {} not found in chapter {}",
                    id,
                    self.current_chapter()
                );
            }
        }
    }

    // --- Selection ---

    pub fn move_selection(&mut self, delta: isize) {
        let (cursor, len) = match self.focus {
            Focus::Chapters => (&mut self.chapter_cursor, self.view.chapters.len()),
            Focus::Bookmarks => (&mut self.bookmark_cursor, self.view.bookmarks.len()),
            Focus::Content => (&mut self.paragraph_cursor, self.view.paragraph_count()),
        };
        if len == 0 {
            return;
        }
        *cursor = cursor.saturating_add_signed(delta).min(len - 1);

        if self.focus == Focus::Content {
            self.scroll_request = ScrollRequest::Follow;
        }
    }

    pub fn select_first(&mut self) {
        self.move_selection(isize::MIN);
    }

    pub fn select_last(&mut self) {
        self.move_selection(isize::MAX);
    }

    // --- Lifecycle ---

    pub fn tick(&mut self, now: Instant) {
        if self.highlighter.expire(now) {
            tracing::trace!("highlight faded");
        }
    }

    pub fn help_text(&self) -> Vec<String> {
        vec![
            format!("{} Commands:", view::APP_TITLE),
            "".to_string(),
            "Moving Around:".to_string(),
            "  Tab / Shift+Tab - Cycle focus: Chapters, Bookmarks, Content".to_string(),
            "  Up/Down         - Move selection".to_string(),
            "  PgUp/PgDn       - Move selection by 10".to_string(),
            "  Home/End        - First / last entry".to_string(),
            "  n / p           - Next / previous chapter".to_string(),
            "  [ / ]           - Back / forward (also Alt+Left / Alt+Right)".to_string(),
            "  g               - Go to a location (#chapter-N)".to_string(),
            "".to_string(),
            "Chapters:".to_string(),
            "  Enter           - Open the selected chapter".to_string(),
            "".to_string(),
            "Content:".to_string(),
            "  b               - Bookmark the selected paragraph".to_string(),
            "  d / Delete      - Remove the bookmark on the selected paragraph".to_string(),
            "".to_string(),
            "Bookmarks:".to_string(),
            "  Enter           - Jump to the bookmarked paragraph".to_string(),
            "  d / Delete      - Delete the selected bookmark".to_string(),
            "".to_string(),
            "  F1              - Show/Hide Help".to_string(),
            "  q / Esc         - Quit".to_string(),
        ]
    }

    pub fn toggle_help(&mut self) {
        self.dialog = if self.dialog == Dialog::Help { Dialog::None } else { Dialog::Help };
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Block, Chapter};
    use crate::highlight::DEFAULT_HIGHLIGHT;
    use crate::store::{BookmarkStore, KeyValueStore, MemoryStore, BOOKMARKS_KEY};
    use crate::view::NO_BOOKMARKS;

    fn three_chapters() -> Book {
        let chapter = |title: &str, paras: &[&str]| {
            let mut blocks = vec![Block::Heading { level: 2, text: title.to_string() }];
            blocks.extend(paras.iter().map(|p| Block::Paragraph(p.to_string())));
            Chapter::new(title, blocks)
        };
        Book::new(
            "The Complete Sherlock Holmes",
            vec![
                chapter("A Scandal in Bohemia", &["To Sherlock Holmes she is always the woman.", "I had seen little of Holmes lately."]),
                chapter("The Red-Headed League", &["I had called upon my friend, Mr. Sherlock Holmes, one day in the autumn.", "\"You could not possibly have come at a better time.\""]),
                chapter("A Case of Identity", &["My dear fellow, said Sherlock Holmes.", "Life is infinitely stranger than anything.", "Depend upon it."]),
            ],
        )
        .unwrap()
    }

    fn app_with(stored: Option<&str>, fragment: Option<&str>) -> App {
        let mut backend = MemoryStore::default();
        if let Some(raw) = stored {
            backend.set(BOOKMARKS_KEY, raw).unwrap();
        }
        let manager = BookmarkManager::open(BookmarkStore::new(Box::new(backend)), 25);
        App::new(three_chapters(), manager, fragment, DEFAULT_HIGHLIGHT)
    }

    #[test]
    fn starts_from_fragment_or_first_chapter() {
        assert_eq!(app_with(None, Some("#chapter-2")).current_chapter(), 2);
        assert_eq!(app_with(None, Some("#chapter-9")).current_chapter(), 0);
        assert_eq!(app_with(None, None).current_chapter(), 0);
    }

    #[test]
    fn selecting_the_current_chapter_is_silent() {
        let mut app = app_with(None, None);
        let renders = app.render_count();

        app.select_chapter(0);
        assert_eq!(app.render_count(), renders);
        assert_eq!(app.fragment(), None);
    }

    #[test]
    fn selecting_a_chapter_writes_fragment_and_scrolls_to_top() {
        let mut app = app_with(None, None);
        app.scroll_request = ScrollRequest::Keep;
        app.paragraph_cursor = 1;

        app.select_chapter(1);
        assert_eq!(app.current_chapter(), 1);
        assert_eq!(app.fragment(), Some("#chapter-1"));
        assert_eq!(app.view().page_title, "The Red-Headed League | Sherlock Holmes Reader");
        assert_eq!(app.scroll_request, ScrollRequest::Top);
        assert_eq!(app.paragraph_cursor, 0);
    }

    #[test]
    fn out_of_range_fragment_is_ignored() {
        let mut app = app_with(None, None);
        let renders = app.render_count();

        app.go_to("#chapter-5");
        assert_eq!(app.current_chapter(), 0);
        assert_eq!(app.render_count(), renders);

        app.go_to("chapter-2");
        assert_eq!(app.current_chapter(), 2);
        assert_eq!(app.fragment(), Some("#chapter-2"));
    }

    #[test]
    fn back_and_forward_follow_history() {
        let mut app = app_with(None, Some("#chapter-0"));
        app.select_chapter(1);
        app.select_chapter(2);

        app.history_back();
        assert_eq!(app.current_chapter(), 1);
        app.history_back();
        assert_eq!(app.current_chapter(), 0);
        app.history_forward();
        assert_eq!(app.current_chapter(), 1);
        assert_eq!(app.fragment(), Some("#chapter-1"));
    }

    #[test]
    fn legacy_bookmark_shows_notice_and_stays_put() {
        let mut app = app_with(Some(r##"[{"id":"para-3","label":"#4 (It was...)","timestamp":1}]"##), Some("#chapter-1"));
        let renders = app.render_count();

        app.open_bookmark(0, Instant::now());
        assert_eq!(app.dialog, Dialog::Notice(LEGACY_NOTICE.to_string()));
        assert_eq!(app.current_chapter(), 1);
        assert_eq!(app.fragment(), Some("#chapter-1"));
        assert_eq!(app.render_count(), renders);
    }

    #[test]
    fn opening_a_bookmark_switches_chapter_and_highlights() {
        let mut app = app_with(Some(r#"[{"id":"ch-2-p-1","label":"A Case of Identity: Life is...","timestamp":1}]"#), None);
        let start = Instant::now();

        app.open_bookmark(0, start);
        assert_eq!(app.current_chapter(), 2);
        assert_eq!(app.fragment(), Some("#chapter-2"));
        assert_eq!(app.paragraph_cursor, 1);
        // heading is block 0, so paragraph 1 is block 2
        assert_eq!(app.scroll_request, ScrollRequest::Center(2));
        assert!(app.is_highlighted("ch-2-p-1"));

        app.tick(start + Duration::from_millis(1500));
        assert!(app.is_highlighted("ch-2-p-1"));
        app.tick(start + DEFAULT_HIGHLIGHT);
        assert!(!app.is_highlighted("ch-2-p-1"));
    }

    #[test]
    fn missing_target_paragraph_is_not_fatal() {
        let mut app = app_with(Some(r#"[{"id":"ch-1-p-40","label":"gone","timestamp":1}]"#), None);
        app.open_bookmark(0, Instant::now());

        assert_eq!(app.current_chapter(), 1);
        assert_eq!(app.dialog, Dialog::None);
        assert!(!app.is_highlighted("ch-1-p-40"));
    }

    #[test]
    fn bookmark_then_delete_by_displayed_position() {
        let mut app = app_with(None, None);
        app.select_chapter(1);
        app.add_bookmark(0);

        let list = app.bookmarks().list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id(), "ch-1-p-0");
        let label = list[0].label();
        assert!(label.starts_with("The Red-Headed League: "));
        let snippet = label.trim_start_matches("The Red-Headed League: ").trim_end_matches("...");
        assert!(snippet.chars().count() <= 25);

        // Position as shown in the freshly rendered list
        let position = app.view().bookmark(0).unwrap().position;
        app.remove_bookmark(position);
        assert!(app.bookmarks().is_empty());
        assert_eq!(app.view().bookmark_rows(), vec![NO_BOOKMARKS.to_string()]);
    }

    #[test]
    fn unbookmark_from_the_content_pane() {
        let mut app = app_with(None, None);
        app.add_bookmark(0);
        app.add_bookmark(1);

        app.unbookmark_paragraph(0);
        assert_eq!(app.bookmarks().list().iter().map(|b| b.id()).collect::<Vec<_>>(), vec!["ch-0-p-1"]);
        app.unbookmark_paragraph(0);
        assert_eq!(app.message, "Paragraph is not bookmarked.");
    }

    #[test]
    fn adding_twice_keeps_one_bookmark() {
        let mut app = app_with(None, None);
        app.add_bookmark(1);
        app.add_bookmark(1);
        assert_eq!(app.bookmarks().len(), 1);
        assert_eq!(app.message, "Paragraph is already bookmarked.");
    }

    #[test]
    fn selection_is_clamped() {
        let mut app = app_with(None, None);
        app.focus = Focus::Content;
        app.move_selection(10);
        assert_eq!(app.paragraph_cursor, 1);
        app.select_first();
        assert_eq!(app.paragraph_cursor, 0);

        app.focus = Focus::Bookmarks;
        app.move_selection(1); // empty list
        assert_eq!(app.bookmark_cursor, 0);

        app.focus = Focus::Chapters;
        app.select_last();
        assert_eq!(app.chapter_cursor, 2);
    }
}
