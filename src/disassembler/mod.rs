//! JVM bytecode disassembler.
//!
//! This module decodes the `code` array of a method's `Code` attribute into structured
//! [`Instruction`]s. Every opcode of the JVM instruction set is described by the static
//! [`INSTRUCTIONS`] table, which drives operand decoding and classification.
//!
//! # Key Types
//! - [`Instruction`] - A decoded JVM instruction with its offset, size and operand
//! - [`Operand`] - Decoded operands (immediates, locals, constant pool indices, branches)
//! - [`FlowType`] - How an instruction affects control flow
//! - [`InstructionCategory`] - Coarse opcode classification
//!
//! # Main Functions
//! - [`decode_instruction`] - Decode a single instruction
//! - [`decode_stream`] - Decode a complete code array
//!
//! # Example
//! ```rust
//! use javacg::disassembler::decode_instruction;
//! use javacg::Parser;
//! let bytecode = &[0x00, 0xB1]; // nop, return
//! let mut parser = Parser::new(bytecode);
//! let instruction = decode_instruction(&mut parser)?;
//! println!("Mnemonic: {}", instruction.mnemonic);
//! # Ok::<(), javacg::Error>(())
//! ```

mod decoder;
mod instruction;
mod instructions;

pub use decoder::{decode_instruction, decode_stream};
pub use instruction::{FlowType, Instruction, InstructionCategory, Operand, OperandType};
pub use instructions::*;
