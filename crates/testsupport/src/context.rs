//! Temporary fixture directories.
//!
//! Each test gets its own directory that is removed on drop.

use fixtures::FixtureStore;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

/// A temporary directory holding fixture and response files.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let dir = TempFixtureDir::new().unwrap();
/// dir.write("teams", r#"{"usp_X": []}"#).unwrap();
/// let mut store = dir.store();
/// assert!(store.load("teams").is_ok());
/// ```
pub struct TempFixtureDir {
    dir: TempDir,
}

impl TempFixtureDir {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `<name>.json` (extension appended when missing).
    pub fn write(&self, name: &str, json: &str) -> io::Result<PathBuf> {
        let file = if name.ends_with(".json") {
            name.to_string()
        } else {
            format!("{name}.json")
        };
        let path = self.dir.path().join(file);
        fs::write(&path, json)?;
        Ok(path)
    }

    /// A fresh store rooted at this directory.
    pub fn store(&self) -> FixtureStore {
        FixtureStore::new(self.dir.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_appends_extension() {
        let dir = TempFixtureDir::new().unwrap();
        let path = dir.write("set", "{}").unwrap();
        assert!(path.ends_with("set.json"));
        assert!(path.exists());
    }

    #[test]
    fn store_is_rooted_in_dir() {
        let dir = TempFixtureDir::new().unwrap();
        assert_eq!(dir.store().root(), dir.path());
    }
}
