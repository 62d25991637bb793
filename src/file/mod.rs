//! Byte-level access to archives and class data.
//!
//! This module provides the foundation the rest of the crate reads from:
//!
//! - [`crate::file::File`] - an owned, immutable view of an archive's bytes, backed either by a
//!   memory-mapped file ([`crate::file::File::from_path`]) or by a heap buffer
//!   ([`crate::file::File::from_mem`])
//! - [`crate::file::parser::Parser`] - a bounds-checked big-endian cursor used by the class
//!   decoder and the bytecode disassembler
//! - [`crate::file::io`] - the primitive read functions behind the parser
//!
//! # Examples
//!
//! ```rust,no_run
//! use javacg::File;
//! use std::path::Path;
//!
//! let file = File::from_path(Path::new("app.jar"))?;
//! println!("{} bytes, starts with {:02X?}", file.len(), file.data_slice(0, 4)?);
//! # Ok::<(), javacg::Error>(())
//! ```

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::{Path, PathBuf};

use crate::{Error::Empty, Result};
use memory::Memory;
use physical::Physical;

/// Storage abstraction behind a [`File`].
///
/// Implementations must hand out stable slices for their whole lifetime; the archive index
/// borrows directly from [`Backend::data`].
pub trait Backend: Send + Sync {
    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range does not fit into the data.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the complete data.
    fn data(&self) -> &[u8];

    /// Returns the total size in bytes.
    fn len(&self) -> usize;
}

/// An immutable, owned view of an input file.
pub struct File {
    data: Box<dyn Backend>,
    path: Option<PathBuf>,
}

impl File {
    /// Memory-maps the file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped and
    /// [`crate::Error::Empty`] if it has no content.
    pub fn from_path(path: &Path) -> Result<File> {
        let input = Physical::new(path)?;

        Self::load(input, Some(path.to_path_buf()))
    }

    /// Wraps an in-memory buffer.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] if `data` is empty.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input, None)
    }

    fn load<T: Backend + 'static>(data: T, path: Option<PathBuf>) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        Ok(File {
            data: Box::new(data),
            path,
        })
    }

    /// The path this file was loaded from, `None` for in-memory data.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the total size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the file holds no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the complete content.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range does not fit into the data.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn file_from_mem() {
        let file = File::from_mem(vec![0x50, 0x4B, 0x05, 0x06]).unwrap();

        assert_eq!(file.len(), 4);
        assert!(!file.is_empty());
        assert!(file.path().is_none());
        assert_eq!(file.data_slice(2, 2).unwrap(), &[0x05, 0x06]);
    }

    #[test]
    fn file_from_mem_empty() {
        assert!(matches!(File::from_mem(Vec::new()), Err(Error::Empty)));
    }

    #[test]
    fn file_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, [1, 2, 3]).unwrap();

        let file = File::from_path(&path).unwrap();
        assert_eq!(file.data(), &[1, 2, 3]);
        assert_eq!(file.path(), Some(path.as_path()));
    }

    #[test]
    fn file_from_path_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        std::fs::write(&path, []).unwrap();

        assert!(matches!(File::from_path(&path), Err(Error::Empty)));
    }
}
