//! Pluggable file access for key loading

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

/// A source of file contents
pub trait FileSystem {
    /// Reads the entire contents of the file at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

impl<T: FileSystem + ?Sized> FileSystem for &'_ T {
    #[inline]
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        T::read(&**self, path)
    }
}

/// The operating system's file system
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    #[inline]
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// An in-memory file system, primarily for tests
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct MemoryFileSystem {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryFileSystem {
    /// An empty file system
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Adds or replaces a file
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl FileSystem for MemoryFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
        })
    }
}
