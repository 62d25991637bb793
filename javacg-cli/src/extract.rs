use std::{
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use javacg::{
    archive::{Archive, ArchiveWalker, WalkStats},
    Error,
};
use log::debug;

use crate::{
    app::{ExtractOptions, GlobalOptions},
    output::JsonSink,
};

/// Walks every archive in order and prints its edges to stdout.
///
/// Returns `Ok(false)` if any archive was missing or failed; those are reported on stderr and
/// the remaining archives are still processed.
///
/// # Errors
/// Returns an error if stdout cannot be written, after which no further archive is processed.
pub fn run(options: &ExtractOptions, global: &GlobalOptions) -> anyhow::Result<bool> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    extract_to(options, global, &mut out)
}

fn extract_to<W: Write>(
    options: &ExtractOptions,
    global: &GlobalOptions,
    out: &mut W,
) -> anyhow::Result<bool> {
    let filter = options.filter();
    let walker = ArchiveWalker::new(&filter)
        .signature_style(options.signature_style())
        .decode_policy(options.decode_policy())
        .parallel(options.parallel);

    let mut totals = WalkStats::default();
    let mut success = true;

    for path in &options.archives {
        match walk_archive(&walker, path, options, global, out) {
            Ok(stats) => {
                debug!(
                    "{}: {} classes, {} edges",
                    path.display(),
                    stats.class_entries,
                    stats.edges
                );
                totals += stats;
            }
            Err(Error::MissingInput(_)) => {
                eprintln!("Jar file {} does not exist", path.display());
                success = false;
            }
            Err(error @ Error::OutputError(_)) => return Err(error.into()),
            Err(error) => {
                let error = anyhow::Error::new(error)
                    .context(format!("failed to process archive: {}", path.display()));
                eprintln!("Error: {error:#}");
                success = false;
            }
        }

        out.flush().context("failed to write output")?;
    }

    debug!(
        "Total: {} classes ({} failed), {} other entries, {} edges",
        totals.class_entries, totals.failed_entries, totals.skipped_entries, totals.edges
    );

    Ok(success)
}

fn walk_archive<W: Write>(
    walker: &ArchiveWalker<'_>,
    path: &Path,
    options: &ExtractOptions,
    global: &GlobalOptions,
    out: &mut W,
) -> javacg::Result<WalkStats> {
    let mut archive = Archive::open(path)?;

    if global.json {
        let mut sink = JsonSink::new(out, options.signature_style());
        walker.walk_to(&mut archive, &mut sink)
    } else {
        walker.walk_archive(&mut archive, out)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Write, path::PathBuf};

    use clap::Parser;
    use javacg::classfile::builder::ClassFileBuilder;
    use zip::{write::SimpleFileOptions, ZipWriter};

    use super::*;
    use crate::app::Cli;

    /// Fails every write and counts the attempts.
    #[derive(Default)]
    struct ClosedPipe {
        attempts: usize,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.attempts += 1;
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn math_jar(dir: &Path, name: &str) -> PathBuf {
        let class = ClassFileBuilder::new("com/acme/Foo")
            .method("bar", "()V", |code| {
                code.invokestatic("java/lang/Math", "max", "(II)I").return_void();
            })
            .build();

        let path = dir.join(name);
        let mut zip = ZipWriter::new(fs::File::create(&path).unwrap());
        zip.start_file("com/acme/Foo.class", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(&class).unwrap();
        zip.finish().unwrap();
        path
    }

    #[test]
    fn closed_output_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let first = math_jar(dir.path(), "first.jar");
        let second = math_jar(dir.path(), "second.jar");
        let cli = Cli::parse_from([
            "javacg".into(),
            first.into_os_string(),
            second.into_os_string(),
        ]);

        let mut out = ClosedPipe::default();
        let result = extract_to(&cli.extract, &cli.global, &mut out);

        let error = result.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::OutputError(_))
        ));
        assert_eq!(out.attempts, 1);
    }

    #[test]
    fn missing_archive_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let jar = math_jar(dir.path(), "math.jar");
        let cli = Cli::parse_from([
            "javacg".into(),
            dir.path().join("missing.jar").into_os_string(),
            jar.into_os_string(),
        ]);

        let mut out = Vec::new();
        let result = extract_to(&cli.extract, &cli.global, &mut out).unwrap();

        assert!(!result);
        assert_eq!(out, b"com.acme.Foo bar java.lang.Math max (int,int)int\n");
    }
}
