use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Reader-wide result type
pub type Result<T> = std::result::Result<T, ReaderError>;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported book format: {} (expected .json or .txt)", .0.display())]
    UnsupportedBookFormat(PathBuf),

    #[error("Book has no chapters: {0}")]
    EmptyBook(String),
}

impl ReaderError {
    // Attach the offending path to a raw io::Error
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReaderError::Io { path: path.into(), source }
    }
}
