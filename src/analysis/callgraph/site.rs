//! Call site representation and invocation kinds.
//!
//! This module defines the types used to represent individual `invoke*` instructions and the
//! method reference they carry, before any filtering or output formatting is applied.

use strum::{Display, EnumIter, IntoStaticStr};

use crate::{
    classfile::constant::ConstantPool,
    disassembler::{
        Instruction, OPCODE_INVOKEINTERFACE, OPCODE_INVOKESPECIAL, OPCODE_INVOKESTATIC,
        OPCODE_INVOKEVIRTUAL,
    },
    Result,
};

/// Kind of invocation instruction.
///
/// Covers the four opcodes that name their target through a method reference. `invokedynamic`
/// has no owning type and never produces a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum InvokeKind {
    /// Instance method with virtual dispatch (`invokevirtual`).
    Virtual,
    /// Constructor, private or superclass method (`invokespecial`).
    Special,
    /// Class method (`invokestatic`).
    Static,
    /// Interface method (`invokeinterface`).
    Interface,
}

impl InvokeKind {
    /// Maps an opcode to its invocation kind, `None` for every other opcode.
    #[must_use]
    pub const fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            OPCODE_INVOKEVIRTUAL => Some(Self::Virtual),
            OPCODE_INVOKESPECIAL => Some(Self::Special),
            OPCODE_INVOKESTATIC => Some(Self::Static),
            OPCODE_INVOKEINTERFACE => Some(Self::Interface),
            _ => None,
        }
    }

    /// Returns the opcode of this invocation kind.
    #[must_use]
    pub const fn opcode(&self) -> u8 {
        match self {
            Self::Virtual => OPCODE_INVOKEVIRTUAL,
            Self::Special => OPCODE_INVOKESPECIAL,
            Self::Static => OPCODE_INVOKESTATIC,
            Self::Interface => OPCODE_INVOKEINTERFACE,
        }
    }
}

/// A specific call instruction within a method body.
///
/// Holds the target exactly as the constant pool names it: the owner in internal form (array
/// classes in descriptor form) and the raw method descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    /// Bytecode offset of the instruction within the method's code.
    pub offset: u32,
    /// Kind of invocation.
    pub kind: InvokeKind,
    /// Internal name of the class or interface declaring the target.
    pub owner: String,
    /// Name of the target method.
    pub name: String,
    /// Descriptor of the target method.
    pub descriptor: String,
}

impl CallSite {
    /// Creates a new call site.
    ///
    /// # Arguments
    ///
    /// * `offset` - The bytecode offset of the call instruction
    /// * `kind` - The kind of invocation
    /// * `owner` - Internal name of the target's owning type
    /// * `name` - Target method name
    /// * `descriptor` - Target method descriptor
    #[must_use]
    pub fn new(
        offset: u32,
        kind: InvokeKind,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            offset,
            kind,
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Resolves the call site of an instruction.
    ///
    /// Returns `Ok(None)` for every instruction that is not one of the four method-reference
    /// invocations, including `invokedynamic`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the instruction's constant pool index does not
    /// resolve to a method reference.
    pub fn resolve(instruction: &Instruction, pool: &ConstantPool) -> Result<Option<CallSite>> {
        let Some(kind) = InvokeKind::from_opcode(instruction.opcode) else {
            return Ok(None);
        };
        let Some(index) = instruction.operand.constant_index() else {
            return Err(malformed_error!(
                "{} at offset {} has no constant pool operand",
                instruction.mnemonic,
                instruction.offset
            ));
        };

        let target = pool.method_ref(index)?;

        Ok(Some(CallSite::new(
            instruction.offset,
            kind,
            target.owner,
            target.name,
            target.descriptor,
        )))
    }
}
