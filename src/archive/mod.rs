//! JAR archive access and traversal.
//!
//! An [`Archive`] owns the bytes of one JAR file (memory-mapped from disk or held in memory) and
//! the zip index built over them. [`ArchiveWalker`] enumerates the archive's entries in
//! central-directory order, decodes every `.class` entry and hands the resulting call edges to
//! an [`EdgeSink`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use javacg::analysis::PackageFilter;
//! use javacg::archive::ArchiveWalker;
//! use std::path::Path;
//!
//! let filter = PackageFilter::from_list("com.acme");
//! let mut out = std::io::stdout().lock();
//! let stats = ArchiveWalker::new(&filter).walk(Path::new("app.jar"), &mut out)?;
//! eprintln!("{} classes, {} edges", stats.class_entries, stats.edges);
//! # Ok::<(), javacg::Error>(())
//! ```

mod walker;

pub use walker::{ArchiveWalker, DecodePolicy, EdgeSink, LineSink, WalkStats};

use std::{
    io::{Cursor, Read},
    path::Path,
};

use ouroboros::self_referencing;
use zip::ZipArchive;

use crate::{file::File, Error, Result};

/// Suffix of the entries that hold class files.
pub const CLASS_SUFFIX: &str = ".class";

/// One entry of an archive, as seen by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A directory or a resource that is not a class file.
    Skipped {
        /// Full entry name
        name: String,
    },
    /// A class file and its decompressed content.
    Class {
        /// Full entry name, e.g. `com/acme/Foo.class`
        name: String,
        /// Decompressed class bytes
        data: Vec<u8>,
    },
}

#[self_referencing]
/// An opened JAR archive.
///
/// The zip index borrows directly from the file data, so entries are inflated straight out of
/// the memory map without copying the archive.
///
/// # Examples
///
/// ```rust,no_run
/// use javacg::archive::{Archive, Entry};
/// use std::path::Path;
///
/// let mut archive = Archive::open(Path::new("app.jar"))?;
/// for index in 0..archive.len() {
///     if let Entry::Class { name, data } = archive.entry(index)? {
///         println!("{name}: {} bytes", data.len());
///     }
/// }
/// # Ok::<(), javacg::Error>(())
/// ```
pub struct Archive {
    /// The underlying archive bytes.
    file: File,
    /// The central directory index, referencing the bytes.
    #[borrows(file)]
    #[not_covariant]
    index: ZipArchive<Cursor<&'this [u8]>>,
}

impl Archive {
    /// Opens and indexes the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `path` does not exist ([`crate::Error::MissingInput`])
    /// - The file cannot be opened or mapped ([`crate::Error::FileError`])
    /// - The file is empty ([`crate::Error::Empty`])
    /// - The file is not a readable zip archive ([`crate::Error::ArchiveError`])
    pub fn open(path: &Path) -> Result<Archive> {
        if !path.exists() {
            return Err(Error::MissingInput(path.to_path_buf()));
        }

        Self::load(File::from_path(path)?)
    }

    /// Indexes an archive held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Empty`] for an empty buffer and [`crate::Error::ArchiveError`]
    /// if the data is not a readable zip archive.
    pub fn from_mem(data: Vec<u8>) -> Result<Archive> {
        Self::load(File::from_mem(data)?)
    }

    fn load(file: File) -> Result<Archive> {
        Archive::try_new(file, |file| {
            ZipArchive::new(Cursor::new(file.data())).map_err(Error::from)
        })
    }

    /// The path the archive was opened from, `None` for in-memory archives.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.borrow_file().path()
    }

    /// Number of entries in the central directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.with_index(|index| index.len())
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of all entries in central-directory order.
    #[must_use]
    pub fn entry_names(&self) -> Vec<String> {
        self.with_index(|index| index.file_names().map(str::to_string).collect())
    }

    /// Reads the entry at position `index`.
    ///
    /// Directories and entries whose name does not end in `.class` are returned as
    /// [`Entry::Skipped`] without being decompressed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ArchiveError`] if the entry cannot be located or its data cannot
    /// be decompressed, and [`crate::Error::FileError`] on a read failure.
    pub fn entry(&mut self, index: usize) -> Result<Entry> {
        self.with_index_mut(|archive| -> Result<Entry> {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();

            if entry.is_dir() || !name.ends_with(CLASS_SUFFIX) {
                return Ok(Entry::Skipped { name });
            }

            let mut data = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            entry.read_to_end(&mut data)?;

            Ok(Entry::Class { name, data })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{create_jar, fixture_math};

    #[test]
    fn open_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.jar");

        assert!(matches!(
            Archive::open(&path),
            Err(Error::MissingInput(p)) if p == path
        ));
    }

    #[test]
    fn open_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.jar");
        std::fs::write(&path, b"not a zip archive at all").unwrap();

        assert!(matches!(Archive::open(&path), Err(Error::ArchiveError(_))));
    }

    #[test]
    fn open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.jar");
        std::fs::write(&path, create_jar(&[("com/acme/Foo.class", fixture_math().as_slice())])).unwrap();

        let archive = Archive::open(&path).unwrap();
        assert_eq!(archive.path(), Some(path.as_path()));
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn entries_in_order() {
        let class = fixture_math();
        let jar = create_jar(&[
            ("META-INF/", b"".as_slice()),
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".as_slice()),
            ("com/acme/Foo.class", class.as_slice()),
            ("com/acme/Foo.class.txt", b"note".as_slice()),
        ]);
        let mut archive = Archive::from_mem(jar).unwrap();

        assert_eq!(archive.len(), 4);
        assert!(archive.path().is_none());
        assert_eq!(
            archive.entry_names(),
            vec![
                "META-INF/",
                "META-INF/MANIFEST.MF",
                "com/acme/Foo.class",
                "com/acme/Foo.class.txt"
            ]
        );

        assert!(matches!(archive.entry(0).unwrap(), Entry::Skipped { .. }));
        assert!(matches!(archive.entry(1).unwrap(), Entry::Skipped { .. }));
        assert_eq!(
            archive.entry(2).unwrap(),
            Entry::Class {
                name: "com/acme/Foo.class".to_string(),
                data: class,
            }
        );
        assert!(matches!(archive.entry(3).unwrap(), Entry::Skipped { .. }));
        assert!(matches!(archive.entry(4), Err(Error::ArchiveError(_))));
    }

    #[test]
    fn from_mem_empty() {
        assert!(matches!(Archive::from_mem(Vec::new()), Err(Error::Empty)));
    }
}
