//! Methods and their `Code` attributes.

use crate::{
    classfile::{constant::ConstantPool, flags::MethodAccessFlags},
    disassembler::{decode_stream, Instruction},
    file::parser::Parser,
    Result,
};

/// Upper bound of a method's code length (JVMS §4.7.3).
pub const MAX_CODE_LENGTH: u32 = 65535;

/// One entry of a `Code` attribute's exception table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// First covered code offset (inclusive)
    pub start_pc: u16,
    /// End of the covered range (exclusive)
    pub end_pc: u16,
    /// Offset of the handler code
    pub handler_pc: u16,
    /// Internal name of the caught class, `None` for `finally` handlers
    pub catch_type: Option<String>,
}

/// The decoded body of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    /// Maximum operand stack depth
    pub max_stack: u16,
    /// Number of local variable slots
    pub max_locals: u16,
    /// Length of the raw code array in bytes
    pub code_length: u32,
    /// Decoded instructions in program order
    pub instructions: Vec<Instruction>,
    /// Exception handlers in declaration order
    pub exception_table: Vec<ExceptionHandler>,
}

impl Code {
    /// Parses the body of a `Code` attribute (everything after `attribute_length`).
    ///
    /// # Errors
    /// Returns an error if the attribute is truncated, the code length is invalid, or the
    /// bytecode cannot be decoded.
    pub fn parse(parser: &mut Parser, pool: &ConstantPool) -> Result<Code> {
        let max_stack = parser.read_be::<u16>()?;
        let max_locals = parser.read_be::<u16>()?;
        let code_length = parser.read_be::<u32>()?;
        if code_length == 0 || code_length > MAX_CODE_LENGTH {
            return Err(malformed_error!("Invalid code length {}", code_length));
        }

        let code = parser.read_bytes(code_length as usize)?;
        let instructions = decode_stream(code)?;

        let handler_count = parser.read_be::<u16>()?;
        let mut exception_table = Vec::with_capacity(handler_count as usize);
        for _ in 0..handler_count {
            let start_pc = parser.read_be::<u16>()?;
            let end_pc = parser.read_be::<u16>()?;
            let handler_pc = parser.read_be::<u16>()?;
            let catch_index = parser.read_be::<u16>()?;
            let catch_type = match catch_index {
                0 => None,
                index => Some(pool.class_name(index)?.to_string()),
            };

            exception_table.push(ExceptionHandler {
                start_pc,
                end_pc,
                handler_pc,
                catch_type,
            });
        }

        // Nested attributes (LineNumberTable, StackMapTable, ...) carry nothing we use
        skip_attributes(parser)?;

        Ok(Code {
            max_stack,
            max_locals,
            code_length,
            instructions,
            exception_table,
        })
    }
}

/// A method declared by a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    /// Binary name of the declaring class
    pub owner: String,
    /// Method name, including the special `<init>` and `<clinit>`
    pub name: String,
    /// Raw method descriptor
    pub descriptor: String,
    /// Access flags
    pub access: MethodAccessFlags,
    /// The method body, `None` for abstract and native methods
    pub code: Option<Code>,
}

impl MethodInfo {
    /// Parses one `method_info` structure.
    ///
    /// # Errors
    /// Returns an error if the structure is truncated, refers to invalid constant pool entries,
    /// carries more than one `Code` attribute, or its bytecode cannot be decoded.
    pub fn parse(parser: &mut Parser, pool: &ConstantPool, owner: &str) -> Result<MethodInfo> {
        let access = MethodAccessFlags::from_bits_retain(parser.read_be::<u16>()?);
        let name = pool.utf8(parser.read_be::<u16>()?)?.to_string();
        let descriptor = pool.utf8(parser.read_be::<u16>()?)?.to_string();

        let mut code = None;
        let attribute_count = parser.read_be::<u16>()?;
        for _ in 0..attribute_count {
            let attribute_name = pool.utf8(parser.read_be::<u16>()?)?;
            let length = parser.read_be::<u32>()? as usize;
            let body = parser.read_bytes(length)?;

            if attribute_name != "Code" {
                continue;
            }
            if code.is_some() {
                return Err(malformed_error!(
                    "Method {}.{}{} has more than one Code attribute",
                    owner,
                    name,
                    descriptor
                ));
            }

            let mut body_parser = Parser::new(body);
            code = Some(Code::parse(&mut body_parser, pool)?);
        }

        Ok(MethodInfo {
            owner: owner.to_string(),
            name,
            descriptor,
            access,
            code,
        })
    }

    /// The decoded instructions, empty for methods without a body.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        match &self.code {
            Some(code) => &code.instructions,
            None => &[],
        }
    }
}

/// Skips an `attributes_count` prefixed attribute table.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if an attribute runs past the end of the data.
pub(crate) fn skip_attributes(parser: &mut Parser) -> Result<()> {
    let count = parser.read_be::<u16>()?;
    for _ in 0..count {
        parser.advance_by(2)?;
        let length = parser.read_be::<u32>()? as usize;
        parser.advance_by(length)?;
    }

    Ok(())
}
