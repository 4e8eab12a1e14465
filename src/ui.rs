//! Drawing. Reads the App's View; the only state it touches is scroll.

use std::io;

use tui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Dialog, Focus, ScrollRequest};
use crate::view::{ContentBlock, APP_TITLE};

const BOOKMARKED_GLYPH: &str = "◆ ";
const UNMARKED_GLYPH: &str = "◇ ";

pub fn ui(f: &mut Frame<CrosstermBackend<io::Stdout>>, app: &mut App) {
    let size = f.size();

    // Status, Message, Main
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints(
            [
                Constraint::Length(1), // Status line
                Constraint::Length(3), // Message bar
                Constraint::Min(0),    // Sidebar + content
            ]
            .as_ref(),
        )
        .split(size);

    render_status_line(f, chunks[0], app);

    let message_block = Block::default().borders(Borders::ALL).title("Status");
    let message_area = message_block.inner(chunks[1]);
    let message = Paragraph::new(app.message.as_str())
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });
    f.render_widget(message_block, chunks[1]);
    f.render_widget(message, message_area);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
        .split(chunks[2]);

    render_sidebar(f, main[0], app);
    render_content(f, main[1], app);

    // Dialogs overlay everything else
    match &app.dialog {
        Dialog::None => {}
        Dialog::Notice(text) => render_notice(f, size, text),
        Dialog::GoTo(input) => render_go_to(f, size, input),
        Dialog::Help => render_help(f, size, app),
    }
}

fn render_status_line(f: &mut Frame<CrosstermBackend<io::Stdout>>, area: Rect, app: &App) {
    let view = app.view();
    let focus_text = match app.focus {
        Focus::Chapters => "CHAPTERS",
        Focus::Bookmarks => "BOOKMARKS",
        Focus::Content => "READING",
    };

    let status_spans = Line::from(vec![
        Span::styled(APP_TITLE, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        Span::styled(focus_text, Style::default().fg(Color::Yellow)),
        Span::raw(" | "),
        Span::styled(
            format!("Chapter {}/{}", view.chapter_index + 1, app.chapter_count()),
            Style::default().fg(Color::Magenta),
        ),
        Span::raw(" | "),
        Span::styled(format!("Bookmarks: {}", app.bookmarks().len()), Style::default().fg(Color::Blue)),
        Span::raw(" | "),
        Span::styled(app.fragment().unwrap_or("#"), Style::default().fg(Color::LightBlue)),
    ]);
    let status_bar = Paragraph::new(status_spans).style(Style::default().bg(Color::DarkGray));
    f.render_widget(status_bar, area);
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default().borders(Borders::ALL).border_style(border).title(title)
}

fn render_sidebar(f: &mut Frame<CrosstermBackend<io::Stdout>>, area: Rect, app: &App) {
    let view = app.view();
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Percentage(55), Constraint::Min(3)].as_ref())
        .split(area);

    let mut heading = vec![Line::from(Span::styled(
        view.book_title.as_str(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))];
    if let Some(author) = &view.book_author {
        heading.push(Line::from(Span::styled(format!("by {}", author), Style::default().fg(Color::Gray))));
    }
    let title = Paragraph::new(heading)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(title, parts[0]);

    // Chapters
    let items: Vec<ListItem> = view
        .chapters
        .iter()
        .map(|c| {
            let style = if c.active {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Span::styled(format!("{}. {}", c.index + 1, c.title), style))
        })
        .collect();
    let focused = app.focus == Focus::Chapters;
    let list = List::new(items)
        .block(pane_block("Chapters", focused))
        .highlight_style(selection_style(focused))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.chapter_cursor));
    f.render_stateful_widget(list, parts[1], &mut state);

    // Bookmarks
    let focused = app.focus == Focus::Bookmarks;
    let rows = view.bookmark_rows();
    let items: Vec<ListItem> = if view.bookmarks.is_empty() {
        rows.iter()
            .map(|r| ListItem::new(Span::styled(r.as_str(), Style::default().fg(Color::DarkGray))))
            .collect()
    } else {
        rows.iter().map(|r| ListItem::new(r.as_str())).collect()
    };
    let list = List::new(items)
        .block(pane_block("Bookmarks", focused))
        .highlight_style(selection_style(focused))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !view.bookmarks.is_empty() {
        state.select(Some(app.bookmark_cursor));
    }
    f.render_stateful_widget(list, parts[2], &mut state);
}

fn selection_style(focused: bool) -> Style {
    if focused {
        Style::default().bg(Color::Blue).fg(Color::White)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    }
}

fn render_content(f: &mut Frame<CrosstermBackend<io::Stdout>>, area: Rect, app: &mut App) {
    let focused = app.focus == Focus::Content;
    let block = pane_block(app.view().chapter_title.as_str(), focused);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let width = (inner.width as usize).saturating_sub(UNMARKED_GLYPH.width()).max(1);
    let (lines, spans) = content_lines(app, width);

    let height = inner.height as usize;
    app.scroll = resolve_scroll(app.scroll_request, app.scroll, &spans, selected_block(app), height, lines.len());
    app.scroll_request = ScrollRequest::Keep;

    let text = Paragraph::new(lines).scroll((app.scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(text, inner);
}

// Block index of the selected paragraph
fn selected_block(app: &App) -> Option<usize> {
    app.view().paragraph(app.paragraph_cursor).map(|(block, _, _)| block)
}

// Screen lines for the chapter, plus (first line, line count) per content block
fn content_lines(app: &App, width: usize) -> (Vec<Line<'static>>, Vec<(usize, usize)>) {
    let view = app.view();
    let selected = selected_block(app);
    let mut lines = Vec::new();
    let mut spans = Vec::with_capacity(view.content.len());

    for (index, block) in view.content.iter().enumerate() {
        let start = lines.len();
        match block {
            ContentBlock::Heading { level, text } => {
                let mut style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
                if *level <= 2 {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                for row in wrap_text(text, width) {
                    lines.push(Line::from(Span::styled(row, style)));
                }
            }
            ContentBlock::Paragraph { id, text, bookmarked, .. } => {
                let mut style = Style::default().fg(Color::White);
                if Some(index) == selected {
                    style = style.bg(Color::DarkGray);
                }
                if app.is_highlighted(id) {
                    style = Style::default().fg(Color::Black).bg(Color::Yellow);
                }
                let (glyph, glyph_style) = if *bookmarked {
                    (BOOKMARKED_GLYPH, Style::default().fg(Color::Yellow))
                } else {
                    (UNMARKED_GLYPH, Style::default().fg(Color::DarkGray))
                };

                for (n, row) in wrap_text(text, width).into_iter().enumerate() {
                    let lead = if n == 0 { glyph } else { "  " };
                    lines.push(Line::from(vec![Span::styled(lead, glyph_style), Span::styled(row, style)]));
                }
            }
        }
        spans.push((start, lines.len() - start));
        lines.push(Line::from(""));
    }

    (lines, spans)
}

fn resolve_scroll(
    request: ScrollRequest,
    current: usize,
    spans: &[(usize, usize)],
    selected: Option<usize>,
    height: usize,
    total: usize,
) -> usize {
    let wanted = match request {
        ScrollRequest::Keep => current,
        ScrollRequest::Top => 0,
        ScrollRequest::Center(block) => match spans.get(block) {
            Some(&(start, len)) => (start + len / 2).saturating_sub(height / 2),
            None => current,
        },
        ScrollRequest::Follow => match selected.and_then(|b| spans.get(b)) {
            Some(&(start, _)) if start < current => start,
            Some(&(start, len)) if start + len > current + height => (start + len).saturating_sub(height).min(start),
            _ => current,
        },
    };
    wanted.min(total.saturating_sub(height))
}

/// Greedy word wrap by terminal columns. Words wider than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_width = 0;

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        let mut word_width = word.width();

        if word_width > width {
            if row_width > 0 {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            let (mut full, rest) = split_columns(&word, width);
            word = rest;
            word_width = word.width();
            rows.append(&mut full);
        }
        if word.is_empty() {
            continue;
        }

        let needed = if row_width == 0 { word_width } else { row_width + 1 + word_width };
        if needed > width {
            rows.push(std::mem::take(&mut row));
            row_width = 0;
        }
        if row_width > 0 {
            row.push(' ');
            row_width += 1;
        }
        row.push_str(&word);
        row_width += word_width;
    }

    if row_width > 0 || rows.is_empty() {
        rows.push(row);
    }
    rows
}

// Cut a long word into full rows of at most `width` columns plus a remainder
fn split_columns(word: &str, width: usize) -> (Vec<String>, String) {
    let mut full = Vec::new();
    let mut chunk = String::new();
    let mut chunk_width = 0;

    for c in word.chars() {
        let w = c.width().unwrap_or(0);
        if chunk_width + w > width && chunk_width > 0 {
            full.push(std::mem::take(&mut chunk));
            chunk_width = 0;
        }
        chunk.push(c);
        chunk_width += w;
    }
    (full, chunk)
}

fn render_notice(f: &mut Frame<CrosstermBackend<io::Stdout>>, area: Rect, text: &str) {
    let popup = centered_rect(60, 25, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title("Notice");

    let body = vec![
        Line::from(text.to_string()),
        Line::from(""),
        Line::from(Span::styled("[Enter] OK", Style::default().fg(Color::DarkGray))),
    ];
    let paragraph = Paragraph::new(body).block(block).wrap(Wrap { trim: true });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn render_go_to(f: &mut Frame<CrosstermBackend<io::Stdout>>, area: Rect, input: &str) {
    let popup = centered_rect(50, 20, area);
    let block = Block::default().borders(Borders::ALL).title("Go To (Enter to confirm, Esc to cancel)");
    let inner = block.inner(popup);

    let line = Line::from(vec![
        Span::raw("Location: "),
        Span::styled(input.to_string(), Style::default().fg(Color::Yellow)),
    ]);

    f.render_widget(Clear, popup);
    f.render_widget(block, popup);
    f.render_widget(Paragraph::new(line), inner);

    let cursor_x = inner.x + ("Location: ".len() + input.width()) as u16;
    f.set_cursor(cursor_x.min(inner.x + inner.width.saturating_sub(1)), inner.y);
}

fn render_help(f: &mut Frame<CrosstermBackend<io::Stdout>>, area: Rect, app: &App) {
    let popup = centered_rect(70, 80, area);
    let block = Block::default().borders(Borders::ALL).title(format!("Help - {}", APP_TITLE));

    let help_text = app.help_text();
    let items: Vec<ListItem> = help_text.iter().map(|line| ListItem::new(line.as_str())).collect();
    let list = List::new(items).block(block).style(Style::default().fg(Color::White));

    f.render_widget(Clear, popup);
    f.render_widget(list, popup);
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);

    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
