//! Key handling. Each handler returns true when it consumed the key.
//!
//! Dialogs get first look, then the focused pane, then global shortcuts.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Dialog, Focus};

const PAGE: isize = 10;

pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Windows terminals also report releases
    if key.kind != KeyEventKind::Press {
        return;
    }

    let mut key_handled = false;

    if app.dialog != Dialog::None {
        key_handled = handle_dialog_input(app, key);
    }

    if !key_handled {
        key_handled = match app.focus {
            Focus::Chapters => handle_chapters_input(app, key),
            Focus::Bookmarks => handle_bookmarks_input(app, key),
            Focus::Content => handle_content_input(app, key),
        };
    }

    if !key_handled {
        handle_global_input(app, key);
    }
}

// Dialogs are modal: every key stops here
fn handle_dialog_input(app: &mut App, key: KeyEvent) -> bool {
    match &mut app.dialog {
        Dialog::Notice(_) => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                app.dialog = Dialog::None;
            }
        }
        Dialog::Help => {
            if matches!(key.code, KeyCode::F(1) | KeyCode::Esc | KeyCode::Char('q')) {
                app.dialog = Dialog::None;
            }
        }
        Dialog::GoTo(input) => match key.code {
            KeyCode::Esc => {
                app.dialog = Dialog::None;
                app.message = "Go to cancelled.".to_string();
            }
            KeyCode::Enter => {
                let target = std::mem::take(input);
                app.dialog = Dialog::None;
                app.go_to(&target);
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        },
        Dialog::None => return false,
    }
    true
}

fn handle_chapters_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => {
            app.select_chapter(app.chapter_cursor);
            true
        }
        _ => handle_list_movement(app, key),
    }
}

fn handle_bookmarks_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => {
            app.open_bookmark(app.bookmark_cursor, Instant::now());
            true
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            app.remove_bookmark(app.bookmark_cursor);
            true
        }
        _ => handle_list_movement(app, key),
    }
}

fn handle_content_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('b') | KeyCode::Enter => {
            app.add_bookmark(app.paragraph_cursor);
            true
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            app.unbookmark_paragraph(app.paragraph_cursor);
            true
        }
        _ => handle_list_movement(app, key),
    }
}

// Shared by all panes; Alt+arrows are left for history
fn handle_list_movement(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::ALT) {
        return false;
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-PAGE),
        KeyCode::PageDown => app.move_selection(PAGE),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        _ => return false,
    }
    true
}

fn handle_global_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.request_quit(),
        KeyCode::Left if key.modifiers.contains(KeyModifiers::ALT) => app.history_back(),
        KeyCode::Right if key.modifiers.contains(KeyModifiers::ALT) => app.history_forward(),
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.previous(),
        KeyCode::Char('n') | KeyCode::Right => app.next_chapter(),
        KeyCode::Char('p') | KeyCode::Left => app.previous_chapter(),
        KeyCode::Char('[') => app.history_back(),
        KeyCode::Char(']') => app.history_forward(),
        KeyCode::Char('g') => app.dialog = Dialog::GoTo(String::from("#chapter-")),
        KeyCode::F(1) | KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('q') | KeyCode::Esc => app.request_quit(),
        _ => return false,
    }
    true
}
