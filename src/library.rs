//! Book directory listing

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;

use crate::reader::Format;

/// Books found in one directory
#[derive(Clone, Debug)]
pub struct Library {
    dir: PathBuf,
}

impl Library {
    /// Library rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory being listed
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Supported files, sorted case-insensitively by file name
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the directory cannot be read.
    pub fn try_scan(&self) -> io::Result<Vec<PathBuf>> {
        let mut books: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && Format::from_path(path).is_some())
            .collect();
        books.sort_by_cached_key(|path| sort_key(path));
        Ok(books)
    }

    /// Like [`try_scan`](Self::try_scan), but an unreadable directory lists
    /// as empty
    pub fn scan(&self) -> Vec<PathBuf> {
        self.try_scan().unwrap_or_else(|e| {
            warn!("cannot list {}: {e}", self.dir.display());
            Vec::new()
        })
    }
}

fn sort_key(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Menu label for a book
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lume-library-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_filters_and_sorts_case_insensitively() {
        let dir = temp_dir("sort");
        for name in ["b.PDF", "A.txt", "c.epub", "notes.md", "Z.TXT", "cover.jpg"] {
            fs::write(dir.join(name), "").unwrap();
        }
        fs::create_dir(dir.join("folder.txt")).unwrap();

        let names: Vec<String> = Library::new(&dir)
            .scan()
            .iter()
            .map(|path| display_name(path))
            .collect();
        assert_eq!(names, ["A.txt", "b.PDF", "c.epub", "Z.TXT"]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let library = Library::new("/nonexistent/lume/books");
        assert!(library.try_scan().is_err());
        assert!(library.scan().is_empty());
    }
}
