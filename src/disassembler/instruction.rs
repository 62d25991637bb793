//! Decoded JVM instruction model.
//!
//! An [`Instruction`] is produced by [`crate::disassembler::decode_instruction`] for every
//! opcode in a method's `Code` attribute. It records where the instruction sits in the code
//! array, its static classification from the opcode table and its decoded [`Operand`].

/// How an instruction's operand bytes are laid out in the code array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    /// No operand bytes.
    None,
    /// One signed byte (`bipush`).
    Int8,
    /// Two signed bytes (`sipush`).
    Int16,
    /// One unsigned byte (`newarray` element type).
    UInt8,
    /// A local variable index, one byte or two under `wide`.
    Local,
    /// A one-byte constant pool index (`ldc`).
    Constant8,
    /// A two-byte constant pool index.
    Constant16,
    /// A signed 16-bit branch offset.
    Branch16,
    /// A signed 32-bit branch offset (`goto_w`, `jsr_w`).
    Branch32,
    /// Local index and signed increment (`iinc`), widened under `wide`.
    Increment,
    /// Constant pool index, argument count and a zero byte.
    InvokeInterface,
    /// Constant pool index followed by two zero bytes.
    InvokeDynamic,
    /// Constant pool index and dimension count.
    MultiANewArray,
    /// Padded jump table.
    TableSwitch,
    /// Padded match/offset pairs.
    LookupSwitch,
    /// The `wide` prefix; the operand belongs to the modified opcode.
    Wide,
}

/// Decoded operand of an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// The instruction has no operand.
    None,
    /// An immediate value (`bipush`, `sipush`, `newarray`).
    Immediate(i32),
    /// A local variable slot.
    Local(u16),
    /// A constant pool index.
    Constant(u16),
    /// A branch offset relative to the instruction's own offset.
    Branch(i32),
    /// `iinc` operands.
    Increment {
        /// Local variable slot
        local: u16,
        /// Signed increment
        delta: i16,
    },
    /// `invokeinterface` operands.
    InvokeInterface {
        /// Constant pool index of the `InterfaceMethodref`
        index: u16,
        /// Historical argument slot count
        count: u8,
    },
    /// `multianewarray` operands.
    MultiANewArray {
        /// Constant pool index of the array class
        index: u16,
        /// Number of dimensions to create
        dimensions: u8,
    },
    /// `tableswitch` operands.
    TableSwitch {
        /// Default branch offset
        default: i32,
        /// Lowest key
        low: i32,
        /// Highest key
        high: i32,
        /// One branch offset per key in `low..=high`
        offsets: Vec<i32>,
    },
    /// `lookupswitch` operands.
    LookupSwitch {
        /// Default branch offset
        default: i32,
        /// `(match, offset)` pairs
        pairs: Vec<(i32, i32)>,
    },
}

impl Operand {
    /// Returns the constant pool index this operand refers to, if any.
    #[must_use]
    pub fn constant_index(&self) -> Option<u16> {
        match self {
            Operand::Constant(index)
            | Operand::InvokeInterface { index, .. }
            | Operand::MultiANewArray { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// How an instruction affects control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// Falls through to the next instruction.
    Sequential,
    /// Branches or falls through.
    ConditionalBranch,
    /// Always branches.
    UnconditionalBranch,
    /// Multi-way branch.
    Switch,
    /// Invokes a method and continues.
    Call,
    /// Returns from the method.
    Return,
    /// Throws an exception.
    Throw,
    /// Jumps to or returns from a `jsr` subroutine.
    Subroutine,
}

/// Coarse classification of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionCategory {
    /// Pushes a constant.
    Constant,
    /// Loads or stores a local variable.
    LoadStore,
    /// Array element access and creation.
    Array,
    /// Operand stack manipulation.
    Stack,
    /// Arithmetic and bitwise operations.
    Arithmetic,
    /// Primitive conversions.
    Conversion,
    /// Comparisons producing an int.
    Comparison,
    /// Branches, switches, returns and throws.
    ControlFlow,
    /// Field access.
    Field,
    /// Method invocation.
    Invocation,
    /// Object creation and type checks.
    Object,
    /// Monitor enter and exit.
    Synchronization,
    /// Everything else (`nop`, `wide`).
    Misc,
}

/// A decoded JVM instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Offset of the first byte (the `wide` prefix, if present) in the code array.
    pub offset: u32,
    /// Encoded size in bytes, including padding and the `wide` prefix.
    pub size: u32,
    /// The opcode; for widened instructions this is the modified opcode, not `0xC4`.
    pub opcode: u8,
    /// `true` if the instruction was prefixed by `wide`.
    pub wide: bool,
    /// The opcode mnemonic, e.g. `invokestatic`.
    pub mnemonic: &'static str,
    /// Static classification of the opcode.
    pub category: InstructionCategory,
    /// Control flow behavior of the opcode.
    pub flow_type: FlowType,
    /// The decoded operand; branch offsets stay relative to [`Instruction::offset`].
    pub operand: Operand,
}

impl Instruction {
    /// Returns `true` for the `invoke*` family, including `invokedynamic`.
    #[must_use]
    pub fn is_invocation(&self) -> bool {
        self.category == InstructionCategory::Invocation
    }
}
