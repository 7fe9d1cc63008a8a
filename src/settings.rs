//! Persisted user settings
//!
//! A small TOML file holding the bookmark and the preferred font size.
//! Reading never fails from the caller's point of view (defaults are used)
//! and a failed save is logged and dropped.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Font size used when none is stored
pub const DEFAULT_FONT_SIZE: u32 = 16;

/// Bookmark and display preferences
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Book the bookmark belongs to
    pub last_book_path: Option<PathBuf>,
    /// Zero-based bookmarked page
    pub last_page: usize,
    /// Glyph size for text pages and the menu
    pub font_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_book_path: None,
            last_page: 0,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl Settings {
    /// Stored page for `path`, if the bookmark belongs to it
    pub fn bookmark_for(&self, path: &Path) -> Option<usize> {
        (self.last_book_path.as_deref() == Some(path)).then_some(self.last_page)
    }
}

/// Settings file location plus load/save policy
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file is unreadable or malformed.
    pub fn try_load(&self) -> Result<Settings, SettingsError> {
        let text = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Read the settings file, falling back to defaults on any failure
    pub fn load(&self) -> Settings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", self.path.display());
                Settings::default()
            }
            Err(e) => {
                warn!("ignoring {}: {e}", self.path.display());
                Settings::default()
            }
        }
    }

    /// Write the settings file atomically
    ///
    /// The content goes to a sibling temp file first and is renamed over the
    /// target, so the file is never left half written.
    pub fn try_save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let text = toml::to_string(settings)?;
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("toml.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(text.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Write the settings file; failures are logged and dropped
    pub fn save(&self, settings: &Settings) {
        match self.try_save(settings) {
            Ok(()) => debug!("settings saved to {}", self.path.display()),
            Err(e) => warn!("could not save {}: {e}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("lume-settings-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let store = SettingsStore::new("/nonexistent/lume/settings.toml");
        let settings = store.load();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.font_size, 16);
        assert_eq!(settings.last_page, 0);
        assert!(settings.last_book_path.is_none());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = temp_dir("malformed");
        let path = dir.join("settings.toml");
        fs::write(&path, "last_page = \"three\"").unwrap();
        let store = SettingsStore::new(&path);
        assert!(matches!(store.try_load(), Err(SettingsError::Decode(_))));
        assert_eq!(store.load(), Settings::default());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = temp_dir("partial");
        let path = dir.join("settings.toml");
        fs::write(&path, "last_page = 7\n").unwrap();
        let settings = SettingsStore::new(&path).load();
        assert_eq!(settings.last_page, 7);
        assert_eq!(settings.font_size, DEFAULT_FONT_SIZE);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_then_load() {
        let dir = temp_dir("roundtrip");
        let store = SettingsStore::new(dir.join("nested").join("settings.toml"));
        let settings = Settings {
            last_book_path: Some(PathBuf::from("/books/moby.txt")),
            last_page: 3,
            font_size: 12,
        };
        store.try_save(&settings).unwrap();
        assert_eq!(store.load(), settings);
        assert!(!store.path().with_extension("toml.tmp").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let dir = temp_dir("blocked");
        // A regular file where the parent directory should be.
        let blocker = dir.join("blocker");
        fs::write(&blocker, "").unwrap();
        let store = SettingsStore::new(blocker.join("settings.toml"));
        assert!(store.try_save(&Settings::default()).is_err());
        store.save(&Settings::default());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_bookmark_for_matches_path() {
        let settings = Settings {
            last_book_path: Some(PathBuf::from("/books/a.txt")),
            last_page: 4,
            ..Settings::default()
        };
        assert_eq!(settings.bookmark_for(Path::new("/books/a.txt")), Some(4));
        assert_eq!(settings.bookmark_for(Path::new("/books/b.txt")), None);
    }
}
