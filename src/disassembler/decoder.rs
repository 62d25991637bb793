//! JVM instruction decoding.
//!
//! This module turns the raw `code` array of a method into a sequence of [`Instruction`]s. The
//! decoder is linear: it walks the array from the first byte to the last, which for verified
//! class files visits every instruction exactly once.
//!
//! # Example: Decoding a Single Instruction
//!
//! ```rust
//! use javacg::{Parser, disassembler::decode_instruction};
//! let code = [0xB1]; // return
//! let mut parser = Parser::new(&code);
//! let instr = decode_instruction(&mut parser)?;
//! assert_eq!(instr.mnemonic, "return");
//! # Ok::<(), javacg::Error>(())
//! ```
//!
//! # Example: Decoding a Stream of Instructions
//!
//! ```rust
//! use javacg::disassembler::decode_stream;
//! let code = [0x2A, 0xB7, 0x00, 0x01, 0xB1]; // aload_0, invokespecial #1, return
//! let instrs = decode_stream(&code)?;
//! assert_eq!(instrs.len(), 3);
//! assert_eq!(instrs[1].offset, 1);
//! # Ok::<(), javacg::Error>(())
//! ```

use crate::{
    disassembler::{
        Instruction, Operand, OperandType, INSTRUCTIONS, OPCODE_WIDE,
    },
    file::parser::Parser,
    Result,
};

/// Decodes every instruction of a method's code array.
///
/// Offsets in the returned instructions are relative to the start of `code`, which is also the
/// reference point for the padding of `tableswitch` and `lookupswitch`.
///
/// # Errors
///
/// Returns an error if:
/// - The code contains an unassigned or reserved opcode
/// - Instruction operands are truncated
/// - `wide` modifies an opcode it cannot apply to
pub fn decode_stream(code: &[u8]) -> Result<Vec<Instruction>> {
    let mut parser = Parser::new(code);
    let mut instructions = Vec::new();

    while parser.has_more_data() {
        instructions.push(decode_instruction(&mut parser)?);
    }

    Ok(instructions)
}

/// Decodes a single JVM instruction from the current parser position.
///
/// The parser must have been created over the complete code array of the method, since the
/// switch instructions align their operands relative to its start. The parser is advanced past
/// the instruction, including any padding.
///
/// # Errors
///
/// Returns an error if the opcode is not assigned, the operands are truncated, or a `wide`
/// prefix is followed by an opcode it cannot modify.
///
/// # Examples
///
/// ```rust
/// use javacg::{disassembler::{decode_instruction, Operand}, Parser};
///
/// // invokestatic #7
/// let bytecode = [0xB8, 0x00, 0x07];
/// let mut parser = Parser::new(&bytecode);
///
/// let instruction = decode_instruction(&mut parser)?;
///
/// assert_eq!(instruction.mnemonic, "invokestatic");
/// assert_eq!(instruction.size, 3);
/// assert_eq!(instruction.operand, Operand::Constant(7));
/// # Ok::<(), javacg::Error>(())
/// ```
pub fn decode_instruction(parser: &mut Parser) -> Result<Instruction> {
    let start = parser.pos();
    let offset = to_offset(start)?;
    let mut opcode = parser.read_be::<u8>()?;

    let wide = opcode == OPCODE_WIDE;
    if wide {
        opcode = parser.read_be::<u8>()?;
    }

    let Some(jvm_instruction) = INSTRUCTIONS.get(opcode as usize) else {
        return Err(malformed_error!(
            "Invalid opcode 0x{:02X} at offset {}",
            opcode,
            offset
        ));
    };

    if wide
        && !matches!(
            jvm_instruction.op_type,
            OperandType::Local | OperandType::Increment
        )
    {
        return Err(malformed_error!(
            "wide cannot modify {} at offset {}",
            jvm_instruction.instr,
            offset
        ));
    }

    let operand = match jvm_instruction.op_type {
        OperandType::None => Operand::None,
        OperandType::Int8 => Operand::Immediate(i32::from(parser.read_be::<i8>()?)),
        OperandType::Int16 => Operand::Immediate(i32::from(parser.read_be::<i16>()?)),
        OperandType::UInt8 => Operand::Immediate(i32::from(parser.read_be::<u8>()?)),
        OperandType::Local => {
            if wide {
                Operand::Local(parser.read_be::<u16>()?)
            } else {
                Operand::Local(u16::from(parser.read_be::<u8>()?))
            }
        }
        OperandType::Constant8 => Operand::Constant(u16::from(parser.read_be::<u8>()?)),
        OperandType::Constant16 => Operand::Constant(parser.read_be::<u16>()?),
        OperandType::Branch16 => Operand::Branch(i32::from(parser.read_be::<i16>()?)),
        OperandType::Branch32 => Operand::Branch(parser.read_be::<i32>()?),
        OperandType::Increment => {
            if wide {
                Operand::Increment {
                    local: parser.read_be::<u16>()?,
                    delta: parser.read_be::<i16>()?,
                }
            } else {
                Operand::Increment {
                    local: u16::from(parser.read_be::<u8>()?),
                    delta: i16::from(parser.read_be::<i8>()?),
                }
            }
        }
        OperandType::InvokeInterface => {
            let index = parser.read_be::<u16>()?;
            let count = parser.read_be::<u8>()?;
            parser.advance_by(1)?;
            Operand::InvokeInterface { index, count }
        }
        OperandType::InvokeDynamic => {
            let index = parser.read_be::<u16>()?;
            parser.advance_by(2)?;
            Operand::Constant(index)
        }
        OperandType::MultiANewArray => Operand::MultiANewArray {
            index: parser.read_be::<u16>()?,
            dimensions: parser.read_be::<u8>()?,
        },
        OperandType::TableSwitch => {
            parser.align(4)?;
            let default = parser.read_be::<i32>()?;
            let low = parser.read_be::<i32>()?;
            let high = parser.read_be::<i32>()?;
            if high < low {
                return Err(malformed_error!(
                    "tableswitch at offset {} has low {} > high {}",
                    offset,
                    low,
                    high
                ));
            }

            let count = (i64::from(high) - i64::from(low) + 1) as usize;
            // Every offset needs four bytes, reject counts the remaining code cannot hold
            if count > (parser.len() - parser.pos()) / 4 {
                return Err(out_of_bounds_error!());
            }

            let mut offsets = Vec::with_capacity(count);
            for _ in 0..count {
                offsets.push(parser.read_be::<i32>()?);
            }
            Operand::TableSwitch {
                default,
                low,
                high,
                offsets,
            }
        }
        OperandType::LookupSwitch => {
            parser.align(4)?;
            let default = parser.read_be::<i32>()?;
            let npairs = parser.read_be::<i32>()?;
            let Ok(npairs) = usize::try_from(npairs) else {
                return Err(malformed_error!(
                    "lookupswitch at offset {} has negative pair count {}",
                    offset,
                    npairs
                ));
            };
            if npairs > (parser.len() - parser.pos()) / 8 {
                return Err(out_of_bounds_error!());
            }

            let mut pairs = Vec::with_capacity(npairs);
            for _ in 0..npairs {
                let key = parser.read_be::<i32>()?;
                let target = parser.read_be::<i32>()?;
                pairs.push((key, target));
            }
            Operand::LookupSwitch { default, pairs }
        }
        OperandType::Wide => {
            return Err(malformed_error!("wide follows wide at offset {}", offset));
        }
    };

    let size = to_offset(parser.pos() - start)?;

    Ok(Instruction {
        offset,
        size,
        opcode,
        wide,
        mnemonic: jvm_instruction.instr,
        category: jvm_instruction.category,
        flow_type: jvm_instruction.flow,
        operand,
    })
}

fn to_offset(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| malformed_error!("Code offset {} exceeds u32", value))
}

#[cfg(test)]
mod tests {
    use crate::{
        disassembler::{
            decode_instruction, decode_stream, FlowType, InstructionCategory, Operand,
        },
        Error, Parser,
    };

    #[test]
    fn decode_instruction_basic() {
        // iload 10
        let mut parser = Parser::new(&[0x15, 0x0A]);

        let result = decode_instruction(&mut parser).unwrap();

        assert_eq!(result.offset, 0);
        assert_eq!(result.size, 2);
        assert_eq!(result.opcode, 0x15);
        assert!(!result.wide);
        assert_eq!(result.mnemonic, "iload");
        assert_eq!(result.category, InstructionCategory::LoadStore);
        assert_eq!(result.flow_type, FlowType::Sequential);
        assert_eq!(result.operand, Operand::Local(10));
    }

    #[test]
    fn decode_instruction_immediates() {
        let instrs = decode_stream(&[0x10, 0xFF, 0x11, 0x01, 0x00, 0xBC, 0x0A]).unwrap();

        assert_eq!(instrs[0].mnemonic, "bipush");
        assert_eq!(instrs[0].operand, Operand::Immediate(-1));
        assert_eq!(instrs[1].mnemonic, "sipush");
        assert_eq!(instrs[1].operand, Operand::Immediate(256));
        assert_eq!(instrs[2].mnemonic, "newarray");
        assert_eq!(instrs[2].operand, Operand::Immediate(10));
    }

    #[test]
    fn decode_instruction_invocations() {
        let code = [
            0xB6, 0x00, 0x02, // invokevirtual #2
            0xB7, 0x00, 0x03, // invokespecial #3
            0xB8, 0x00, 0x04, // invokestatic #4
            0xB9, 0x00, 0x05, 0x02, 0x00, // invokeinterface #5, 2
            0xBA, 0x00, 0x06, 0x00, 0x00, // invokedynamic #6
        ];
        let instrs = decode_stream(&code).unwrap();

        assert_eq!(instrs.len(), 5);
        assert!(instrs.iter().all(|i| i.is_invocation()));
        assert!(instrs.iter().all(|i| i.flow_type == FlowType::Call));
        assert_eq!(instrs[0].operand, Operand::Constant(2));
        assert_eq!(
            instrs[3].operand,
            Operand::InvokeInterface { index: 5, count: 2 }
        );
        assert_eq!(instrs[3].size, 5);
        assert_eq!(instrs[4].operand, Operand::Constant(6));
        assert_eq!(instrs[4].offset, 14);
        assert_eq!(instrs[4].size, 5);
    }

    #[test]
    fn decode_instruction_branch() {
        // nop, goto -1
        let instrs = decode_stream(&[0x00, 0xA7, 0xFF, 0xFF]).unwrap();

        assert_eq!(instrs[1].mnemonic, "goto");
        assert_eq!(instrs[1].flow_type, FlowType::UnconditionalBranch);
        assert_eq!(instrs[1].operand, Operand::Branch(-1));
    }

    #[test]
    fn decode_instruction_branch_target_not_checked() {
        // goto -1 at offset 0, the offset stays relative and is not resolved
        let mut parser = Parser::new(&[0xA7, 0xFF, 0xFF]);
        let result = decode_instruction(&mut parser).unwrap();

        assert_eq!(result.operand, Operand::Branch(-1));
        assert_eq!(result.size, 3);
    }

    #[test]
    fn decode_instruction_wide() {
        let code = [
            0xC4, 0x15, 0x01, 0x00, // wide iload 256
            0xC4, 0x84, 0x01, 0x00, 0xFF, 0x00, // wide iinc 256, -256
        ];
        let instrs = decode_stream(&code).unwrap();

        assert_eq!(instrs.len(), 2);
        assert!(instrs[0].wide);
        assert_eq!(instrs[0].opcode, 0x15);
        assert_eq!(instrs[0].size, 4);
        assert_eq!(instrs[0].operand, Operand::Local(256));
        assert_eq!(
            instrs[1].operand,
            Operand::Increment {
                local: 256,
                delta: -256
            }
        );
        assert_eq!(instrs[1].size, 6);
    }

    #[test]
    fn decode_instruction_wide_invalid() {
        // wide nop
        let mut parser = Parser::new(&[0xC4, 0x00]);
        assert!(decode_instruction(&mut parser).is_err());
    }

    #[test]
    fn decode_instruction_tableswitch() {
        let code = [
            0x00, // nop
            0xAA, // tableswitch
            0x00, 0x00, // padding to offset 4
            0x00, 0x00, 0x00, 0x20, // default +32
            0x00, 0x00, 0x00, 0x01, // low 1
            0x00, 0x00, 0x00, 0x02, // high 2
            0x00, 0x00, 0x00, 0x10, // +16
            0x00, 0x00, 0x00, 0x18, // +24
        ];
        let mut parser = Parser::new(&code);
        parser.advance_by(1).unwrap();

        let result = decode_instruction(&mut parser).unwrap();

        assert_eq!(result.mnemonic, "tableswitch");
        assert_eq!(result.offset, 1);
        assert_eq!(result.size, 23);
        assert_eq!(result.flow_type, FlowType::Switch);
        assert_eq!(
            result.operand,
            Operand::TableSwitch {
                default: 32,
                low: 1,
                high: 2,
                offsets: vec![16, 24],
            }
        );
        assert!(!parser.has_more_data());
    }

    #[test]
    fn decode_instruction_lookupswitch() {
        let code = [
            0xAB, // lookupswitch
            0x00, 0x00, 0x00, // padding
            0x00, 0x00, 0x00, 0x14, // default +20
            0x00, 0x00, 0x00, 0x01, // 1 pair
            0x00, 0x00, 0x00, 0x2A, // match 42
            0x00, 0x00, 0x00, 0x18, // +24
        ];
        let instrs = decode_stream(&code).unwrap();

        assert_eq!(instrs.len(), 1);
        assert_eq!(
            instrs[0].operand,
            Operand::LookupSwitch {
                default: 20,
                pairs: vec![(42, 24)],
            }
        );
    }

    #[test]
    fn decode_instruction_switch_huge_count() {
        let code = [
            0xAA, 0x00, 0x00, 0x00, // tableswitch + padding
            0x00, 0x00, 0x00, 0x00, // default
            0x80, 0x00, 0x00, 0x00, // low i32::MIN
            0x7F, 0xFF, 0xFF, 0xFF, // high i32::MAX
        ];
        assert!(matches!(decode_stream(&code), Err(Error::OutOfBounds)));
    }

    #[test]
    fn decode_instruction_reserved_opcode() {
        // breakpoint
        let mut parser = Parser::new(&[0xCA]);
        assert!(matches!(
            decode_instruction(&mut parser),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn decode_instruction_truncated() {
        // invokestatic with a single index byte
        assert!(matches!(
            decode_stream(&[0xB8, 0x00]),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn decode_stream_offsets() {
        // aload_0, invokespecial #1, ldc #2, return
        let instrs = decode_stream(&[0x2A, 0xB7, 0x00, 0x01, 0x12, 0x02, 0xB1]).unwrap();

        let offsets: Vec<u32> = instrs.iter().map(|i| i.offset).collect();
        assert_eq!(offsets, vec![0, 1, 4, 6]);
        assert_eq!(instrs[2].operand, Operand::Constant(2));
        assert_eq!(instrs[3].flow_type, FlowType::Return);
    }
}
