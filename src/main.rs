use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use tui::{backend::CrosstermBackend, Terminal};

mod app;
mod book;
mod bookmarks;
mod cli;
mod config;
mod error;
mod highlight;
mod input;
mod logging;
mod navigation;
mod paragraph_id;
mod store;
mod ui;
mod view;

use app::App;
use book::Book;
use bookmarks::BookmarkManager;
use cli::Cli;
use config::Config;
use store::{BookmarkStore, FileStore};

// How long to wait for a key before running timers again
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let config = Config::load(&config_path);

    let log_file = cli.log_file.clone().unwrap_or_else(|| config.log_file());
    if let Err(e) = logging::init_logging(&log_file, cli.verbose) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let book = match cli.book.as_ref().or(config.book_path.as_ref()) {
        Some(path) => Book::load(path)?,
        None => {
            tracing::info!("no book given, opening the bundled sample");
            Book::sample()?
        }
    };

    let store_dir = cli.store_dir.clone().unwrap_or_else(|| config.store_dir());
    tracing::info!("bookmarks stored in {}", store_dir.display());
    let store = BookmarkStore::new(Box::new(FileStore::new(store_dir)));
    let bookmarks = BookmarkManager::open(store, config.snippet_chars);

    let mut app = App::new(book, bookmarks, cli.fragment.as_deref(), config.highlight_duration());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    // Restore terminal even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!("reader stopped: {}", e);
    }
    tracing::info!("reader closed");
    result.map_err(Into::into)
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    let mut shown_title = String::new();

    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        if app.view().page_title != shown_title {
            shown_title = app.view().page_title.clone();
            execute!(terminal.backend_mut(), SetTitle(&shown_title))?;
        }

        app.tick(Instant::now());

        if event::poll(POLL_INTERVAL)? {
            // Resize just redraws on the next pass
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
