//! Reader settings, read from config.json in the app's config directory.
//!
//! Every field has a default, so a missing or partial file is fine.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bookmarks::DEFAULT_SNIPPET_CHARS;
use crate::error::{ReaderError, Result};
use crate::highlight::DEFAULT_HIGHLIGHT;

const APP_DIR: &str = "sherlock-reader";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "reader.log";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub book_path: Option<PathBuf>,
    pub snippet_chars: usize,
    pub highlight_ms: u64,
    pub store_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            book_path: None,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
            highlight_ms: DEFAULT_HIGHLIGHT.as_millis() as u64,
            store_dir: None,
            log_file: None,
        }
    }
}

// Platform config dir, then a hidden dir in home, then the working directory
pub fn config_dir() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join(APP_DIR)
    } else if let Some(home_dir) = dirs::home_dir() {
        home_dir.join(".sherlock-reader")
    } else {
        PathBuf::from(".sherlock-reader")
    }
}

pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

impl Config {
    /// Load from `path`, falling back to defaults if the file is missing or
    /// broken. Logging is not up yet at this point, so problems go to stderr.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Config::default();
        }
        match Config::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: ignoring config file: {}", e);
                Config::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| ReaderError::io(path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn store_dir(&self) -> PathBuf {
        self.store_dir.clone().unwrap_or_else(config_dir)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| config_dir().join(LOG_FILE))
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.json"));
        assert_eq!(config, Config::default());
        assert_eq!(config.snippet_chars, 25);
        assert_eq!(config.highlight_duration(), Duration::from_millis(2000));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"snippet_chars": 40, "store_dir": "/var/lib/marks"}"#).unwrap();

        let config = Config::load(&path);
        assert_eq!(config.snippet_chars, 40);
        assert_eq!(config.highlight_ms, 2000);
        assert_eq!(config.store_dir(), PathBuf::from("/var/lib/marks"));
        assert!(config.book_path.is_none());
    }

    #[test]
    fn broken_file_is_an_error_but_load_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ snippet_chars: ").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ReaderError::Json(_))));
        assert_eq!(Config::load(&path), Config::default());
    }

    #[test]
    fn default_paths_live_in_the_config_dir() {
        let config = Config::default();
        assert_eq!(config.store_dir(), config_dir());
        assert_eq!(config.log_file(), config_dir().join("reader.log"));
        assert_eq!(default_config_path().file_name().unwrap(), "config.json");
    }
}
