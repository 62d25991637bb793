//! # javacg Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the javacg
//! library. Import this module to get quick access to the essential types for call graph
//! extraction.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all javacg operations
pub use crate::Error;

/// The result type used throughout javacg
pub use crate::Result;

/// Low-level file parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Archives
// ================================================================================================

/// Archive access and traversal
pub use crate::archive::{Archive, ArchiveWalker, DecodePolicy, EdgeSink, LineSink, WalkStats};

// ================================================================================================
// Class Files
// ================================================================================================

/// Class file decoding
pub use crate::classfile::{
    flags::{ClassAccessFlags, MethodAccessFlags},
    method::MethodInfo,
    ClassFile,
};

// ================================================================================================
// Call Graph
// ================================================================================================

/// Call edge extraction
pub use crate::analysis::{
    CallEdge, CallExtractor, CallSite, InvokeKind, PackageFilter, SignatureStyle,
};

// ================================================================================================
// Disassembler
// ================================================================================================

/// Instruction decoding
pub use crate::disassembler::{decode_instruction, decode_stream, Instruction, Operand};
