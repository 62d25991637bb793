use std::path::PathBuf;

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The variants map onto the three failure classes a call-graph run can hit: a missing input
/// archive, an archive that cannot be opened or indexed, and a class entry whose bytes cannot be
/// decoded. The remaining variants describe the low-level decoding failure in more detail and are
/// usually found as the `source` of [`Error::ClassDecode`].
///
/// # Error Categories
///
/// ## Class Decoding Errors
/// - [`Error::Malformed`] - Corrupted or invalid class file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the buffer
/// - [`Error::InvalidMagic`] - The blob is not a class file
/// - [`Error::Empty`] - Empty input provided
///
/// ## I/O and Archive Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::OutputError`] - Failures writing edges to a sink
/// - [`Error::ArchiveError`] - The archive could not be opened, indexed or inflated
/// - [`Error::MissingInput`] - The archive path does not exist
/// - [`Error::ClassDecode`] - A class entry inside an archive failed to decode
///
/// # Examples
///
/// ```rust,no_run
/// use javacg::{archive::Archive, Error};
/// use std::path::Path;
///
/// match Archive::open(Path::new("app.jar")) {
///     Ok(archive) => println!("{} entries", archive.len()),
///     Err(Error::MissingInput(path)) => eprintln!("{} does not exist", path.display()),
///     Err(Error::ArchiveError(err)) => eprintln!("Not a readable archive: {err}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The class file is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The blob does not start with the `0xCAFEBABE` class file magic.
    #[error("Invalid class file magic - 0x{0:08X}")]
    InvalidMagic(u32),

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error while opening or mapping an archive.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Writing edges to the output failed, e.g. because the reading end of a pipe closed.
    ///
    /// Unlike the other variants this is not specific to one archive; callers processing
    /// several archives should stop.
    #[error("Failed to write output: {0}")]
    OutputError(#[source] std::io::Error),

    /// The archive could not be opened, indexed or one of its entries could not be read.
    #[error("{0}")]
    ArchiveError(#[from] zip::result::ZipError),

    /// The named archive path does not exist.
    #[error("Archive {} does not exist", .0.display())]
    MissingInput(PathBuf),

    /// A class entry of an archive could not be decoded.
    ///
    /// # Fields
    ///
    /// * `entry` - The archive entry name, e.g. `com/acme/Foo.class`
    /// * `source` - The underlying decoding error
    #[error("Failed to decode {entry}")]
    ClassDecode {
        /// Name of the archive entry that failed
        entry: String,
        /// The decoding error reported for that entry
        #[source]
        source: Box<Error>,
    },
}
