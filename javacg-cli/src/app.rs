use std::path::PathBuf;

use clap::Parser;
use javacg::{
    analysis::{PackageFilter, SignatureStyle},
    archive::DecodePolicy,
};

/// javacg - static call graph extraction for JAR archives
///
/// Prints one line per call instruction found in the classes of each archive:
/// `<callerType> <callerMethod> <calleeType> <calleeMethod> <calleeSignature>`
#[derive(Debug, Parser)]
#[command(name = "javacg", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(flatten)]
    pub extract: ExtractOptions,
}

/// Options controlling output and logging.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit one JSON object per edge instead of text lines.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Options controlling edge extraction.
#[derive(Debug, Parser)]
pub struct ExtractOptions {
    /// JAR archives to analyze, processed in order.
    #[arg(value_name = "JAR", required = true)]
    pub archives: Vec<PathBuf>,

    /// Comma-separated package prefixes; only calls into matching types are printed.
    /// Repeating the flag replaces the earlier list.
    #[arg(long = "includePackages", value_name = "PREFIXES", require_equals = true)]
    pub include_packages: Vec<String>,

    /// Print raw JVM descriptors, e.g. (II)I, instead of Java types.
    #[arg(long)]
    pub descriptors: bool,

    /// Report classes that fail to decode and continue with the next entry.
    #[arg(long)]
    pub skip_malformed: bool,

    /// Decode classes of each archive in parallel.
    #[arg(long)]
    pub parallel: bool,
}

impl ExtractOptions {
    /// The package filter from the last `--includePackages` list, empty if none was given.
    pub fn filter(&self) -> PackageFilter {
        self.include_packages
            .last()
            .map(|list| PackageFilter::from_list(list))
            .unwrap_or_default()
    }

    pub fn signature_style(&self) -> SignatureStyle {
        if self.descriptors {
            SignatureStyle::Descriptor
        } else {
            SignatureStyle::Readable
        }
    }

    pub fn decode_policy(&self) -> DecodePolicy {
        if self.skip_malformed {
            DecodePolicy::Skip
        } else {
            DecodePolicy::Abort
        }
    }
}
