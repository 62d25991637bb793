//! Program analysis over decoded classes.
//!
//! # Architecture
//!
//! - [`callgraph`] - Call site resolution, package filtering and call edge extraction
//!
//! # Usage
//!
//! ```rust
//! use javacg::analysis::{CallExtractor, PackageFilter};
//! use javacg::classfile::{builder::ClassFileBuilder, ClassFile};
//!
//! let bytes = ClassFileBuilder::new("com/acme/Foo")
//!     .method("<init>", "()V", |code| {
//!         code.aload(0)
//!             .invokespecial("java/lang/Object", "<init>", "()V")
//!             .return_void();
//!     })
//!     .build();
//! let class = ClassFile::parse(&bytes)?;
//!
//! let filter = PackageFilter::from_list("com.acme");
//! assert!(CallExtractor::new(&filter).extract(&class)?.is_empty());
//! # Ok::<(), javacg::Error>(())
//! ```

pub mod callgraph;

// Re-export primary types at module level
pub use callgraph::{
    CallEdge, CallExtractor, CallSite, InvokeKind, PackageFilter, SignatureStyle,
};
