//! Archive traversal and edge output.

use std::{io::Write, ops::AddAssign, path::Path};

use log::{debug, warn};
use rayon::prelude::*;

use crate::{
    analysis::{CallEdge, CallExtractor, PackageFilter, SignatureStyle},
    archive::{Archive, Entry},
    classfile::ClassFile,
    Error, Result,
};

/// Number of class entries held in memory at once by the parallel walk.
const PARALLEL_CHUNK: usize = 64;

/// What to do when a class entry fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Stop the archive with [`crate::Error::ClassDecode`]. Edges of earlier classes stay
    /// written.
    #[default]
    Abort,
    /// Log the failure, count it in [`WalkStats::failed_entries`] and continue.
    Skip,
}

/// Counters collected while walking an archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Entries ending in `.class`, including those that failed to decode
    pub class_entries: usize,
    /// Directories and non-class entries
    pub skipped_entries: usize,
    /// Class entries skipped under [`DecodePolicy::Skip`]
    pub failed_entries: usize,
    /// Edges handed to the sink
    pub edges: usize,
}

impl AddAssign for WalkStats {
    fn add_assign(&mut self, other: Self) {
        self.class_entries += other.class_entries;
        self.skipped_entries += other.skipped_entries;
        self.failed_entries += other.failed_entries;
        self.edges += other.edges;
    }
}

/// Destination of the edges produced by an [`ArchiveWalker`].
///
/// The walker calls [`EdgeSink::accept`] once per successfully decoded class, in entry order,
/// even when the class has no edges.
pub trait EdgeSink {
    /// Receives the edges of the class stored in entry `entry`.
    ///
    /// # Errors
    /// An error aborts the walk and is returned to the caller unchanged.
    fn accept(&mut self, entry: &str, edges: &[CallEdge]) -> Result<()>;
}

/// An [`EdgeSink`] writing one text line per edge.
pub struct LineSink<W> {
    out: W,
    style: SignatureStyle,
}

impl<W: Write> LineSink<W> {
    /// Creates a sink writing lines rendered in `style` to `out`.
    pub fn new(out: W, style: SignatureStyle) -> Self {
        LineSink { out, style }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EdgeSink for LineSink<W> {
    fn accept(&mut self, _entry: &str, edges: &[CallEdge]) -> Result<()> {
        for edge in edges {
            edge.write_line(&mut self.out, self.style)?;
        }
        Ok(())
    }
}

/// Walks JAR archives and emits the call edges of every class they contain.
///
/// Entries are processed in central-directory order. Each class entry is decoded, its edges are
/// extracted with the configured [`PackageFilter`] and handed to the sink before the next
/// entry is looked at, so output streams class by class.
///
/// Read failures of the archive itself (a corrupt compressed stream, an unreadable central
/// directory) always end the walk with [`crate::Error::ArchiveError`]. Failures to decode a
/// class follow the [`DecodePolicy`].
///
/// # Examples
///
/// ```rust
/// use javacg::analysis::{PackageFilter, SignatureStyle};
/// use javacg::archive::{Archive, ArchiveWalker, DecodePolicy};
///
/// # fn jar() -> Vec<u8> {
/// #     use std::io::Write;
/// #     let class = javacg::classfile::builder::ClassFileBuilder::new("com/acme/Foo")
/// #         .method("bar", "()V", |code| {
/// #             code.invokestatic("java/lang/Math", "max", "(II)I").return_void();
/// #         })
/// #         .build();
/// #     let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
/// #     zip.start_file("com/acme/Foo.class", zip::write::SimpleFileOptions::default()).unwrap();
/// #     zip.write_all(&class).unwrap();
/// #     zip.finish().unwrap().into_inner()
/// # }
/// let filter = PackageFilter::default();
/// let walker = ArchiveWalker::new(&filter)
///     .signature_style(SignatureStyle::Descriptor)
///     .decode_policy(DecodePolicy::Skip);
///
/// let mut archive = Archive::from_mem(jar())?;
/// let mut out = Vec::new();
/// let stats = walker.walk_archive(&mut archive, &mut out)?;
///
/// assert_eq!(stats.edges, 1);
/// assert_eq!(out, b"com.acme.Foo bar java.lang.Math max (II)I\n");
/// # Ok::<(), javacg::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ArchiveWalker<'a> {
    filter: &'a PackageFilter,
    style: SignatureStyle,
    policy: DecodePolicy,
    parallel: bool,
}

impl<'a> ArchiveWalker<'a> {
    /// Creates a sequential walker with readable signatures that aborts on decode errors.
    #[must_use]
    pub fn new(filter: &'a PackageFilter) -> Self {
        ArchiveWalker {
            filter,
            style: SignatureStyle::default(),
            policy: DecodePolicy::default(),
            parallel: false,
        }
    }

    /// Sets the rendering of callee types and signatures for line output.
    #[must_use]
    pub fn signature_style(mut self, style: SignatureStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the handling of class entries that fail to decode.
    #[must_use]
    pub fn decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Decodes class entries on the rayon thread pool.
    ///
    /// Entry data is still read in order, in chunks of a bounded number of classes, and results
    /// are delivered in entry order, so the output is identical to the sequential walk.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Opens the archive at `path` and writes its edge lines to `out`.
    ///
    /// # Errors
    /// Returns the errors of [`Archive::open`] and [`ArchiveWalker::walk_archive`].
    pub fn walk<W: Write>(&self, path: &Path, out: &mut W) -> Result<WalkStats> {
        let mut archive = Archive::open(path)?;
        debug!("Opened archive {} ({} entries)", path.display(), archive.len());

        self.walk_archive(&mut archive, out)
    }

    /// Writes the edge lines of every class in `archive` to `out`.
    ///
    /// # Errors
    /// Returns [`crate::Error::ArchiveError`] if an entry cannot be read,
    /// [`crate::Error::ClassDecode`] for the first undecodable class under
    /// [`DecodePolicy::Abort`], and [`crate::Error::OutputError`] if writing fails.
    pub fn walk_archive<W: Write>(&self, archive: &mut Archive, out: &mut W) -> Result<WalkStats> {
        let mut sink = LineSink::new(out, self.style);
        self.walk_to(archive, &mut sink)
    }

    /// Hands the edges of every class in `archive` to `sink`.
    ///
    /// # Errors
    /// See [`ArchiveWalker::walk_archive`]; errors returned by the sink are passed through.
    pub fn walk_to<S: EdgeSink + ?Sized>(
        &self,
        archive: &mut Archive,
        sink: &mut S,
    ) -> Result<WalkStats> {
        let stats = if self.parallel {
            self.walk_parallel(archive, sink)?
        } else {
            self.walk_sequential(archive, sink)?
        };

        debug!(
            "Walked {} class entries ({} skipped, {} failed), {} edges",
            stats.class_entries, stats.skipped_entries, stats.failed_entries, stats.edges
        );
        Ok(stats)
    }

    fn walk_sequential<S: EdgeSink + ?Sized>(
        &self,
        archive: &mut Archive,
        sink: &mut S,
    ) -> Result<WalkStats> {
        let extractor = CallExtractor::new(self.filter);
        let mut stats = WalkStats::default();

        for index in 0..archive.len() {
            match archive.entry(index)? {
                Entry::Skipped { .. } => stats.skipped_entries += 1,
                Entry::Class { name, data } => {
                    stats.class_entries += 1;
                    let result = extract_entry(&extractor, &data);
                    self.deliver(&name, result, &mut stats, sink)?;
                }
            }
        }

        Ok(stats)
    }

    fn walk_parallel<S: EdgeSink + ?Sized>(
        &self,
        archive: &mut Archive,
        sink: &mut S,
    ) -> Result<WalkStats> {
        let extractor = CallExtractor::new(self.filter);
        let mut stats = WalkStats::default();
        let mut chunk = Vec::with_capacity(PARALLEL_CHUNK);
        let mut index = 0;

        while index < archive.len() {
            // A read failure ends the walk; classes read before it are still delivered
            let mut read_error = None;
            while index < archive.len() && chunk.len() < PARALLEL_CHUNK {
                let entry = archive.entry(index);
                index += 1;
                match entry {
                    Ok(Entry::Skipped { .. }) => stats.skipped_entries += 1,
                    Ok(Entry::Class { name, data }) => chunk.push((name, data)),
                    Err(error) => {
                        read_error = Some(error);
                        break;
                    }
                }
            }

            let results: Vec<Result<Vec<CallEdge>>> = chunk
                .par_iter()
                .map(|(_, data)| extract_entry(&extractor, data))
                .collect();

            for ((name, _), result) in chunk.drain(..).zip(results) {
                stats.class_entries += 1;
                self.deliver(&name, result, &mut stats, sink)?;
            }

            if let Some(error) = read_error {
                return Err(error);
            }
        }

        Ok(stats)
    }

    fn deliver<S: EdgeSink + ?Sized>(
        &self,
        name: &str,
        result: Result<Vec<CallEdge>>,
        stats: &mut WalkStats,
        sink: &mut S,
    ) -> Result<()> {
        match result {
            Ok(edges) => {
                stats.edges += edges.len();
                sink.accept(name, &edges)
            }
            Err(error) => match self.policy {
                DecodePolicy::Abort => Err(Error::ClassDecode {
                    entry: name.to_string(),
                    source: Box::new(error),
                }),
                DecodePolicy::Skip => {
                    warn!("Skipping {name}: {error}");
                    stats.failed_entries += 1;
                    Ok(())
                }
            },
        }
    }
}

fn extract_entry(extractor: &CallExtractor<'_>, data: &[u8]) -> Result<Vec<CallEdge>> {
    let class = ClassFile::parse(data)?;
    extractor.extract(&class)
}
