//! The JVM opcode table.
//!
//! [`INSTRUCTIONS`] is indexed by opcode and covers `0x00` (`nop`) through `0xC9` (`jsr_w`).
//! Opcodes above that are reserved (`breakpoint`, `impdep1`, `impdep2`) or unassigned and never
//! appear in a valid class file.

use crate::disassembler::{FlowType, InstructionCategory, OperandType};

/// Static description of one opcode.
#[derive(Debug, Clone, Copy)]
pub struct JvmInstruction {
    /// Mnemonic as used by `javap`
    pub instr: &'static str,
    /// Operand layout
    pub op_type: OperandType,
    /// Coarse classification
    pub category: InstructionCategory,
    /// Control flow behavior
    pub flow: FlowType,
}

const fn op(
    instr: &'static str,
    op_type: OperandType,
    category: InstructionCategory,
    flow: FlowType,
) -> JvmInstruction {
    JvmInstruction {
        instr,
        op_type,
        category,
        flow,
    }
}

/// Opcode `0xC4`, which modifies the operand width of the following instruction.
pub const OPCODE_WIDE: u8 = 0xC4;
/// Opcode `0x84`, the only arithmetic instruction `wide` can modify.
pub const OPCODE_IINC: u8 = 0x84;
/// Opcode `0xB6`.
pub const OPCODE_INVOKEVIRTUAL: u8 = 0xB6;
/// Opcode `0xB7`.
pub const OPCODE_INVOKESPECIAL: u8 = 0xB7;
/// Opcode `0xB8`.
pub const OPCODE_INVOKESTATIC: u8 = 0xB8;
/// Opcode `0xB9`.
pub const OPCODE_INVOKEINTERFACE: u8 = 0xB9;
/// Opcode `0xBA`.
pub const OPCODE_INVOKEDYNAMIC: u8 = 0xBA;

/// All assigned JVM opcodes, indexed by opcode value.
pub const INSTRUCTIONS: [JvmInstruction; 0xCA] = [
    /* 0x00 */ op("nop", OperandType::None, InstructionCategory::Misc, FlowType::Sequential),
    /* 0x01 */ op("aconst_null", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x02 */ op("iconst_m1", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x03 */ op("iconst_0", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x04 */ op("iconst_1", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x05 */ op("iconst_2", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x06 */ op("iconst_3", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x07 */ op("iconst_4", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x08 */ op("iconst_5", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x09 */ op("lconst_0", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x0A */ op("lconst_1", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x0B */ op("fconst_0", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x0C */ op("fconst_1", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x0D */ op("fconst_2", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x0E */ op("dconst_0", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x0F */ op("dconst_1", OperandType::None, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x10 */ op("bipush", OperandType::Int8, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x11 */ op("sipush", OperandType::Int16, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x12 */ op("ldc", OperandType::Constant8, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x13 */ op("ldc_w", OperandType::Constant16, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x14 */ op("ldc2_w", OperandType::Constant16, InstructionCategory::Constant, FlowType::Sequential),
    /* 0x15 */ op("iload", OperandType::Local, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x16 */ op("lload", OperandType::Local, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x17 */ op("fload", OperandType::Local, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x18 */ op("dload", OperandType::Local, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x19 */ op("aload", OperandType::Local, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x1A */ op("iload_0", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x1B */ op("iload_1", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x1C */ op("iload_2", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x1D */ op("iload_3", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x1E */ op("lload_0", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x1F */ op("lload_1", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x20 */ op("lload_2", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x21 */ op("lload_3", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x22 */ op("fload_0", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x23 */ op("fload_1", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x24 */ op("fload_2", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x25 */ op("fload_3", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x26 */ op("dload_0", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x27 */ op("dload_1", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x28 */ op("dload_2", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x29 */ op("dload_3", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x2A */ op("aload_0", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x2B */ op("aload_1", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x2C */ op("aload_2", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x2D */ op("aload_3", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x2E */ op("iaload", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x2F */ op("laload", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x30 */ op("faload", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x31 */ op("daload", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x32 */ op("aaload", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x33 */ op("baload", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x34 */ op("caload", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x35 */ op("saload", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x36 */ op("istore", OperandType::Local, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x37 */ op("lstore", OperandType::Local, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x38 */ op("fstore", OperandType::Local, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x39 */ op("dstore", OperandType::Local, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x3A */ op("astore", OperandType::Local, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x3B */ op("istore_0", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x3C */ op("istore_1", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x3D */ op("istore_2", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x3E */ op("istore_3", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x3F */ op("lstore_0", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x40 */ op("lstore_1", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x41 */ op("lstore_2", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x42 */ op("lstore_3", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x43 */ op("fstore_0", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x44 */ op("fstore_1", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x45 */ op("fstore_2", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x46 */ op("fstore_3", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x47 */ op("dstore_0", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x48 */ op("dstore_1", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x49 */ op("dstore_2", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x4A */ op("dstore_3", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x4B */ op("astore_0", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x4C */ op("astore_1", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x4D */ op("astore_2", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x4E */ op("astore_3", OperandType::None, InstructionCategory::LoadStore, FlowType::Sequential),
    /* 0x4F */ op("iastore", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x50 */ op("lastore", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x51 */ op("fastore", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x52 */ op("dastore", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x53 */ op("aastore", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x54 */ op("bastore", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x55 */ op("castore", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x56 */ op("sastore", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0x57 */ op("pop", OperandType::None, InstructionCategory::Stack, FlowType::Sequential),
    /* 0x58 */ op("pop2", OperandType::None, InstructionCategory::Stack, FlowType::Sequential),
    /* 0x59 */ op("dup", OperandType::None, InstructionCategory::Stack, FlowType::Sequential),
    /* 0x5A */ op("dup_x1", OperandType::None, InstructionCategory::Stack, FlowType::Sequential),
    /* 0x5B */ op("dup_x2", OperandType::None, InstructionCategory::Stack, FlowType::Sequential),
    /* 0x5C */ op("dup2", OperandType::None, InstructionCategory::Stack, FlowType::Sequential),
    /* 0x5D */ op("dup2_x1", OperandType::None, InstructionCategory::Stack, FlowType::Sequential),
    /* 0x5E */ op("dup2_x2", OperandType::None, InstructionCategory::Stack, FlowType::Sequential),
    /* 0x5F */ op("swap", OperandType::None, InstructionCategory::Stack, FlowType::Sequential),
    /* 0x60 */ op("iadd", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x61 */ op("ladd", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x62 */ op("fadd", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x63 */ op("dadd", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x64 */ op("isub", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x65 */ op("lsub", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x66 */ op("fsub", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x67 */ op("dsub", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x68 */ op("imul", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x69 */ op("lmul", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x6A */ op("fmul", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x6B */ op("dmul", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x6C */ op("idiv", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x6D */ op("ldiv", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x6E */ op("fdiv", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x6F */ op("ddiv", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x70 */ op("irem", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x71 */ op("lrem", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x72 */ op("frem", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x73 */ op("drem", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x74 */ op("ineg", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x75 */ op("lneg", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x76 */ op("fneg", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x77 */ op("dneg", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x78 */ op("ishl", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x79 */ op("lshl", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x7A */ op("ishr", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x7B */ op("lshr", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x7C */ op("iushr", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x7D */ op("lushr", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x7E */ op("iand", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x7F */ op("land", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x80 */ op("ior", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x81 */ op("lor", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x82 */ op("ixor", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x83 */ op("lxor", OperandType::None, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x84 */ op("iinc", OperandType::Increment, InstructionCategory::Arithmetic, FlowType::Sequential),
    /* 0x85 */ op("i2l", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x86 */ op("i2f", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x87 */ op("i2d", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x88 */ op("l2i", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x89 */ op("l2f", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x8A */ op("l2d", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x8B */ op("f2i", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x8C */ op("f2l", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x8D */ op("f2d", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x8E */ op("d2i", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x8F */ op("d2l", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x90 */ op("d2f", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x91 */ op("i2b", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x92 */ op("i2c", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x93 */ op("i2s", OperandType::None, InstructionCategory::Conversion, FlowType::Sequential),
    /* 0x94 */ op("lcmp", OperandType::None, InstructionCategory::Comparison, FlowType::Sequential),
    /* 0x95 */ op("fcmpl", OperandType::None, InstructionCategory::Comparison, FlowType::Sequential),
    /* 0x96 */ op("fcmpg", OperandType::None, InstructionCategory::Comparison, FlowType::Sequential),
    /* 0x97 */ op("dcmpl", OperandType::None, InstructionCategory::Comparison, FlowType::Sequential),
    /* 0x98 */ op("dcmpg", OperandType::None, InstructionCategory::Comparison, FlowType::Sequential),
    /* 0x99 */ op("ifeq", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0x9A */ op("ifne", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0x9B */ op("iflt", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0x9C */ op("ifge", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0x9D */ op("ifgt", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0x9E */ op("ifle", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0x9F */ op("if_icmpeq", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0xA0 */ op("if_icmpne", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0xA1 */ op("if_icmplt", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0xA2 */ op("if_icmpge", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0xA3 */ op("if_icmpgt", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0xA4 */ op("if_icmple", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0xA5 */ op("if_acmpeq", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0xA6 */ op("if_acmpne", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0xA7 */ op("goto", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::UnconditionalBranch),
    /* 0xA8 */ op("jsr", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::Subroutine),
    /* 0xA9 */ op("ret", OperandType::Local, InstructionCategory::ControlFlow, FlowType::Subroutine),
    /* 0xAA */ op("tableswitch", OperandType::TableSwitch, InstructionCategory::ControlFlow, FlowType::Switch),
    /* 0xAB */ op("lookupswitch", OperandType::LookupSwitch, InstructionCategory::ControlFlow, FlowType::Switch),
    /* 0xAC */ op("ireturn", OperandType::None, InstructionCategory::ControlFlow, FlowType::Return),
    /* 0xAD */ op("lreturn", OperandType::None, InstructionCategory::ControlFlow, FlowType::Return),
    /* 0xAE */ op("freturn", OperandType::None, InstructionCategory::ControlFlow, FlowType::Return),
    /* 0xAF */ op("dreturn", OperandType::None, InstructionCategory::ControlFlow, FlowType::Return),
    /* 0xB0 */ op("areturn", OperandType::None, InstructionCategory::ControlFlow, FlowType::Return),
    /* 0xB1 */ op("return", OperandType::None, InstructionCategory::ControlFlow, FlowType::Return),
    /* 0xB2 */ op("getstatic", OperandType::Constant16, InstructionCategory::Field, FlowType::Sequential),
    /* 0xB3 */ op("putstatic", OperandType::Constant16, InstructionCategory::Field, FlowType::Sequential),
    /* 0xB4 */ op("getfield", OperandType::Constant16, InstructionCategory::Field, FlowType::Sequential),
    /* 0xB5 */ op("putfield", OperandType::Constant16, InstructionCategory::Field, FlowType::Sequential),
    /* 0xB6 */ op("invokevirtual", OperandType::Constant16, InstructionCategory::Invocation, FlowType::Call),
    /* 0xB7 */ op("invokespecial", OperandType::Constant16, InstructionCategory::Invocation, FlowType::Call),
    /* 0xB8 */ op("invokestatic", OperandType::Constant16, InstructionCategory::Invocation, FlowType::Call),
    /* 0xB9 */ op("invokeinterface", OperandType::InvokeInterface, InstructionCategory::Invocation, FlowType::Call),
    /* 0xBA */ op("invokedynamic", OperandType::InvokeDynamic, InstructionCategory::Invocation, FlowType::Call),
    /* 0xBB */ op("new", OperandType::Constant16, InstructionCategory::Object, FlowType::Sequential),
    /* 0xBC */ op("newarray", OperandType::UInt8, InstructionCategory::Array, FlowType::Sequential),
    /* 0xBD */ op("anewarray", OperandType::Constant16, InstructionCategory::Array, FlowType::Sequential),
    /* 0xBE */ op("arraylength", OperandType::None, InstructionCategory::Array, FlowType::Sequential),
    /* 0xBF */ op("athrow", OperandType::None, InstructionCategory::ControlFlow, FlowType::Throw),
    /* 0xC0 */ op("checkcast", OperandType::Constant16, InstructionCategory::Object, FlowType::Sequential),
    /* 0xC1 */ op("instanceof", OperandType::Constant16, InstructionCategory::Object, FlowType::Sequential),
    /* 0xC2 */ op("monitorenter", OperandType::None, InstructionCategory::Synchronization, FlowType::Sequential),
    /* 0xC3 */ op("monitorexit", OperandType::None, InstructionCategory::Synchronization, FlowType::Sequential),
    /* 0xC4 */ op("wide", OperandType::Wide, InstructionCategory::Misc, FlowType::Sequential),
    /* 0xC5 */ op("multianewarray", OperandType::MultiANewArray, InstructionCategory::Array, FlowType::Sequential),
    /* 0xC6 */ op("ifnull", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0xC7 */ op("ifnonnull", OperandType::Branch16, InstructionCategory::ControlFlow, FlowType::ConditionalBranch),
    /* 0xC8 */ op("goto_w", OperandType::Branch32, InstructionCategory::ControlFlow, FlowType::UnconditionalBranch),
    /* 0xC9 */ op("jsr_w", OperandType::Branch32, InstructionCategory::ControlFlow, FlowType::Subroutine),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_opcode() {
        assert_eq!(INSTRUCTIONS[0x00].instr, "nop");
        assert_eq!(INSTRUCTIONS[0x12].instr, "ldc");
        assert_eq!(INSTRUCTIONS[OPCODE_IINC as usize].instr, "iinc");
        assert_eq!(INSTRUCTIONS[0xAA].instr, "tableswitch");
        assert_eq!(INSTRUCTIONS[OPCODE_INVOKEVIRTUAL as usize].instr, "invokevirtual");
        assert_eq!(INSTRUCTIONS[OPCODE_INVOKESPECIAL as usize].instr, "invokespecial");
        assert_eq!(INSTRUCTIONS[OPCODE_INVOKESTATIC as usize].instr, "invokestatic");
        assert_eq!(INSTRUCTIONS[OPCODE_INVOKEINTERFACE as usize].instr, "invokeinterface");
        assert_eq!(INSTRUCTIONS[OPCODE_INVOKEDYNAMIC as usize].instr, "invokedynamic");
        assert_eq!(INSTRUCTIONS[OPCODE_WIDE as usize].instr, "wide");
        assert_eq!(INSTRUCTIONS[0xC9].instr, "jsr_w");
        assert!(INSTRUCTIONS.get(0xCA).is_none());
    }

    #[test]
    fn invocations_are_calls() {
        for entry in INSTRUCTIONS.iter() {
            let is_invocation = entry.category == InstructionCategory::Invocation;
            assert_eq!(is_invocation, entry.flow == FlowType::Call, "{}", entry.instr);
            assert_eq!(is_invocation, entry.instr.starts_with("invoke"), "{}", entry.instr);
        }
    }
}
