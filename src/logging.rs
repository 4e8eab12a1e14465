//! Logging via `tracing`.
//!
//! The terminal belongs to the reader UI, so log lines always go to a file.
//! `SHERLOCK_READER_LOG` takes an `EnvFilter` directive and overrides `-v`.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ReaderError, Result};

pub const LOG_ENV: &str = "SHERLOCK_READER_LOG";

/// 0: info, 1 (`-v`): debug, 2+ (`-vv`): trace
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        // Dependencies stay quiet unless asked for
        EnvFilter::new(format!("warn,sherlock_reader={}", level.as_str().to_lowercase()))
    })
}

/// Install the global subscriber, appending to `path`. Call once at startup.
pub fn init_logging(path: &Path, verbosity: u8) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| ReaderError::io(parent, e))?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ReaderError::io(path, e))?;

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(build_env_filter(level_for_verbosity(verbosity)))
        .with(layer)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for_verbosity(0), Level::INFO);
        assert_eq!(level_for_verbosity(1), Level::DEBUG);
        assert_eq!(level_for_verbosity(2), Level::TRACE);
        assert_eq!(level_for_verbosity(9), Level::TRACE);
    }
}
