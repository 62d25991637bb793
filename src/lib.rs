// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # javacg
//!
//! A static call graph extractor for compiled JVM programs. `javacg` reads JAR archives,
//! decodes every class file they contain, walks the bytecode of each method and emits one edge
//! per call instruction, from the calling method to the method the instruction references.
//!
//! The output is a flat, non-deduplicated edge list meant for downstream graph tooling:
//!
//! ```text
//! com.acme.Foo bar java.lang.Math max (int,int)int
//! ```
//!
//! ## Features
//!
//! - **📦 Efficient archive access** - Memory-mapped JARs, entries inflated straight from the map
//! - **🔍 Complete class file decoding** - Constant pool, methods and the full JVM instruction set
//! - **🧭 Deterministic output** - Entries in archive order, methods in declaration order,
//!   calls in program order
//! - **🧹 Package filtering** - Keep only edges into the packages you care about
//! - **⚡ Optional parallelism** - Decode classes on a rayon pool with identical output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use javacg::prelude::*;
//! use std::path::Path;
//!
//! let filter = PackageFilter::from_list("com.acme");
//! let mut out = std::io::stdout().lock();
//! ArchiveWalker::new(&filter).walk(Path::new("app.jar"), &mut out)?;
//! # Ok::<(), javacg::Error>(())
//! ```
//!
//! ### Working with single classes
//!
//! ```rust
//! use javacg::prelude::*;
//! use javacg::classfile::builder::ClassFileBuilder;
//!
//! let bytes = ClassFileBuilder::new("com/acme/Foo")
//!     .method("bar", "()V", |code| {
//!         code.invokestatic("java/lang/Math", "max", "(II)I").return_void();
//!     })
//!     .build();
//!
//! let class = ClassFile::parse(&bytes)?;
//! let filter = PackageFilter::default();
//! for edge in CallExtractor::new(&filter).extract(&class)? {
//!     println!("{}", edge.to_line(SignatureStyle::Descriptor));
//! }
//! # Ok::<(), javacg::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`file`] - Byte-level access: memory-mapped or in-memory data and the big-endian [`Parser`]
//! - [`classfile`] - Class file decoding, descriptors and a class file builder
//! - [`disassembler`] - JVM instruction decoding
//! - [`analysis`] - Call site resolution, package filtering and edge extraction
//! - [`archive`] - JAR indexing and the archive walker
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Failures inside an archive carry the
//! entry name:
//!
//! ```rust,no_run
//! use javacg::{analysis::PackageFilter, archive::ArchiveWalker, Error};
//! use std::path::Path;
//!
//! let filter = PackageFilter::default();
//! let mut out = Vec::new();
//! match ArchiveWalker::new(&filter).walk(Path::new("app.jar"), &mut out) {
//!     Ok(stats) => println!("{} edges", stats.edges),
//!     Err(Error::MissingInput(path)) => println!("Jar file {} does not exist", path.display()),
//!     Err(Error::ClassDecode { entry, source }) => println!("{entry}: {source}"),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! ### Fuzzing
//!
//! ```bash
//! cargo +nightly fuzz run classfile --release
//! ```
//!
//! ### Testing
//!
//! ```bash
//! cargo test --workspace
//! cargo bench
//! ```

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use javacg::prelude::*;
///
/// let filter = PackageFilter::from_list("com.acme");
/// let mut archive = Archive::open(std::path::Path::new("app.jar"))?;
/// let stats = ArchiveWalker::new(&filter).walk_archive(&mut archive, &mut std::io::sink())?;
/// # Ok::<(), javacg::Error>(())
/// ```
pub mod prelude;

pub mod file;

pub mod classfile;

pub mod disassembler;

pub mod analysis;

pub mod archive;

/// `javacg` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
///
/// # Examples
///
/// ```rust,no_run
/// use javacg::{classfile::ClassFile, Result};
///
/// fn load_class(path: &str) -> Result<ClassFile> {
///     ClassFile::parse(&std::fs::read(path)?)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;

/// Low-level access to input data.
///
/// - [`File`] - Memory-mapped or in-memory input, see [`file::File`]
/// - [`Parser`] - Bounds-checked big-endian cursor, see [`file::parser::Parser`]
pub use file::{parser::Parser, File};
