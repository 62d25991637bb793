//! JVM class file decoding.
//!
//! [`ClassFile::parse`] turns the bytes of one `.class` archive entry into an immutable
//! [`ClassFile`]: the class name, its supertypes, the constant pool and every declared method
//! with its decoded instruction stream. Fields and attributes that play no part in call-graph
//! extraction are validated for length and skipped.
//!
//! Parsing is strict about everything the call extractor depends on. Every `invoke*`
//! instruction must point at a well-formed method reference with a valid descriptor, so
//! extraction from a successfully parsed class cannot fail on bad constant pool data.
//!
//! # Examples
//!
//! ```rust
//! use javacg::classfile::{builder::ClassFileBuilder, ClassFile};
//!
//! let bytes = ClassFileBuilder::new("com/acme/Foo")
//!     .method("bar", "()V", |code| {
//!         code.invokestatic("java/lang/Math", "max", "(II)I").return_void();
//!     })
//!     .build();
//!
//! let class = ClassFile::parse(&bytes)?;
//! assert_eq!(class.name, "com.acme.Foo");
//! assert_eq!(class.super_name.as_deref(), Some("java.lang.Object"));
//! assert_eq!(class.methods[0].name, "bar");
//! # Ok::<(), javacg::Error>(())
//! ```

pub mod builder;
pub mod constant;
pub mod descriptor;
pub mod flags;
pub mod method;

use log::debug;

use crate::{
    disassembler::{
        OPCODE_INVOKEDYNAMIC, OPCODE_INVOKEINTERFACE, OPCODE_INVOKESPECIAL, OPCODE_INVOKESTATIC,
        OPCODE_INVOKEVIRTUAL,
    },
    file::parser::Parser,
    Error, Result,
};
use constant::ConstantPool;
use descriptor::{binary_name, MethodDescriptor};
use flags::ClassAccessFlags;
use method::{skip_attributes, MethodInfo};

/// The magic number every class file starts with.
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// A decoded class file.
#[derive(Debug, Clone)]
pub struct ClassFile {
    /// Minor format version
    pub minor_version: u16,
    /// Major format version (52 = Java 8)
    pub major_version: u16,
    /// The constant pool
    pub constant_pool: ConstantPool,
    /// Class access flags
    pub access: ClassAccessFlags,
    /// Binary name, e.g. `com.acme.Foo` or `com.acme.Foo$Inner`
    pub name: String,
    /// Binary name of the superclass, `None` for `java.lang.Object` and `module-info`
    pub super_name: Option<String>,
    /// Binary names of the direct superinterfaces
    pub interfaces: Vec<String>,
    /// Number of declared fields
    pub field_count: u16,
    /// Declared methods in class file order
    pub methods: Vec<MethodInfo>,
}

impl ClassFile {
    /// Parses a complete class file.
    ///
    /// # Errors
    /// - [`crate::Error::Empty`] if `data` is empty
    /// - [`crate::Error::InvalidMagic`] if `data` does not start with `0xCAFEBABE`
    /// - [`crate::Error::OutOfBounds`] if a structure is truncated
    /// - [`crate::Error::Malformed`] for invalid constant pool references, descriptors or
    ///   bytecode
    pub fn parse(data: &[u8]) -> Result<ClassFile> {
        if data.is_empty() {
            return Err(Error::Empty);
        }

        let mut parser = Parser::new(data);
        let magic = parser.read_be::<u32>()?;
        if magic != CLASS_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let minor_version = parser.read_be::<u16>()?;
        let major_version = parser.read_be::<u16>()?;
        let constant_pool = ConstantPool::parse(&mut parser)?;

        let access = ClassAccessFlags::from_bits_retain(parser.read_be::<u16>()?);
        let name = binary_name(constant_pool.class_name(parser.read_be::<u16>()?)?);
        let super_name = match parser.read_be::<u16>()? {
            0 => None,
            index => Some(binary_name(constant_pool.class_name(index)?)),
        };

        let interface_count = parser.read_be::<u16>()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(binary_name(
                constant_pool.class_name(parser.read_be::<u16>()?)?,
            ));
        }

        let field_count = parser.read_be::<u16>()?;
        for _ in 0..field_count {
            // access_flags, name_index, descriptor_index
            parser.advance_by(6)?;
            skip_attributes(&mut parser)?;
        }

        let method_count = parser.read_be::<u16>()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            methods.push(MethodInfo::parse(&mut parser, &constant_pool, &name)?);
        }

        skip_attributes(&mut parser)?;
        if parser.has_more_data() {
            return Err(malformed_error!(
                "{} trailing bytes after class {}",
                parser.len() - parser.pos(),
                name
            ));
        }

        let class = ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access,
            name,
            super_name,
            interfaces,
            field_count,
            methods,
        };
        class.validate_invocations()?;

        debug!(
            "Parsed class {} (version {}.{}, {} methods)",
            class.name,
            class.major_version,
            class.minor_version,
            class.methods.len()
        );

        Ok(class)
    }

    fn validate_invocations(&self) -> Result<()> {
        for method in &self.methods {
            for instruction in method.instructions() {
                let Some(index) = instruction.operand.constant_index() else {
                    continue;
                };

                match instruction.opcode {
                    OPCODE_INVOKEVIRTUAL
                    | OPCODE_INVOKESPECIAL
                    | OPCODE_INVOKESTATIC
                    | OPCODE_INVOKEINTERFACE => {
                        let target = self.constant_pool.method_ref(index)?;
                        MethodDescriptor::parse(target.descriptor)?;
                    }
                    OPCODE_INVOKEDYNAMIC => {
                        self.constant_pool.invoke_dynamic(index)?;
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}
