//! Static call graph extraction.
//!
//! This module turns decoded classes into flat lists of call edges. It does not build an
//! in-memory graph or resolve virtual dispatch: every `invokevirtual`, `invokespecial`,
//! `invokestatic` and `invokeinterface` instruction yields exactly one edge to the method
//! reference it names, unless the [`PackageFilter`] excludes the target's owner.
//!
//! # Components
//!
//! - [`CallSite`]: A specific call instruction and the method reference it carries
//! - [`InvokeKind`]: The invocation opcode family
//! - [`CallEdge`]: A caller-to-callee edge and its line format
//! - [`PackageFilter`]: Prefix filtering of call targets
//! - [`CallExtractor`]: Per-class edge extraction

mod edge;
mod extractor;
mod filter;
mod site;

pub use edge::{escape_field, CallEdge, SignatureStyle, FIELD_SEPARATOR};
pub use extractor::CallExtractor;
pub use filter::{PackageFilter, LIST_SEPARATOR};
pub use site::{CallSite, InvokeKind};
