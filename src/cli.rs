//! Command-line arguments. Anything given here overrides config.json.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "sherlock-reader",
    version,
    about = "Read the Sherlock Holmes canon in the terminal, one chapter at a time"
)]
pub struct Cli {
    /// Book to open: a generated .json book or the plain-text canon (.txt).
    #[arg(value_name = "BOOK")]
    pub book: Option<PathBuf>,

    /// Starting location, e.g. "#chapter-3".
    #[arg(short = 'f', long = "fragment", value_name = "FRAGMENT", allow_hyphen_values = true)]
    pub fragment: Option<String>,

    /// Directory holding saved bookmarks.
    #[arg(long = "store-dir", value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Read settings from this file instead of the default config.json.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write logs here instead of the config directory.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// More log detail (-v debug, -vv trace).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}
