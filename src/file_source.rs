//! File-system access for the mapping store.
//!
//! The store talks to storage only through [`FileSource`], with every path
//! relative to the source root. [`DirectoryFileSource`] is the implementation
//! backed by a real directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

/// A file found under a [`FileSource`] root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    path: PathBuf,
    relative: PathBuf,
}

impl TextFile {
    pub fn new(path: PathBuf, relative: PathBuf) -> Self {
        Self { path, relative }
    }

    /// Full path, as reported in diagnostics.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the file source root.
    pub fn relative_path(&self) -> &Path {
        &self.relative
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.path.extension().is_some_and(|ext| ext == extension)
    }
}

/// Storage primitives used by the mapping store.
pub trait FileSource {
    fn path(&self) -> &Path;

    fn exists(&self) -> bool;

    /// A file source rooted at the named sub-directory.
    fn child(&self, name: &str) -> Self
    where
        Self: Sized;

    fn create_directories(&self, relative: &Path) -> io::Result<()>;

    /// Every regular file below the root, in a stable order.
    fn list_files_recursively(&self) -> io::Result<Vec<TextFile>>;

    fn read_text_file(&self, relative: &Path) -> io::Result<String>;

    fn write_text_file(&self, relative: &Path, contents: &str) -> io::Result<()>;

    fn delete_file(&self, relative: &Path) -> io::Result<()>;
}

/// [`FileSource`] over a directory on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryFileSource {
    root: PathBuf,
}

impl DirectoryFileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileSource for DirectoryFileSource {
    fn path(&self) -> &Path {
        &self.root
    }

    fn exists(&self) -> bool {
        self.root.is_dir()
    }

    fn child(&self, name: &str) -> Self {
        Self::new(self.root.join(name))
    }

    fn create_directories(&self, relative: &Path) -> io::Result<()> {
        fs::create_dir_all(self.root.join(relative))
    }

    fn list_files_recursively(&self) -> io::Result<Vec<TextFile>> {
        if !self.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", self.root.display()),
            ));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {e}", self.root.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| entry.path().to_path_buf());
            files.push(TextFile::new(entry.path().to_path_buf(), relative));
        }
        Ok(files)
    }

    fn read_text_file(&self, relative: &Path) -> io::Result<String> {
        fs::read_to_string(self.root.join(relative))
    }

    /// Writes `contents`, creating missing parent directories first.
    fn write_text_file(&self, relative: &Path, contents: &str) -> io::Result<()> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    fn delete_file(&self, relative: &Path) -> io::Result<()> {
        fs::remove_file(self.root.join(relative))
    }
}
