//! The run-time constant pool of a class file.
//!
//! The pool is indexed from `1`; index `0` and the slot following every `Long` and `Double`
//! entry are unusable. [`ConstantPool`] stores one [`Constant`] per slot, with
//! [`Constant::Unusable`] filling the gaps so that indices from instructions map directly.
//!
//! Resolution helpers check the tag of every entry they follow, so a reference to the wrong
//! kind of constant surfaces as [`crate::Error::Malformed`] instead of a panic.

use strum::{Display, FromRepr};

use crate::{file::parser::Parser, Result};

/// Tag byte that introduces every constant pool entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, Display)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ConstantTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    Fieldref = 9,
    Methodref = 10,
    InterfaceMethodref = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

/// One constant pool entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Slot `0` and the second slot of `Long`/`Double` entries
    Unusable,
    /// Decoded modified UTF-8 text
    Utf8(String),
    /// 32-bit integer
    Integer(i32),
    /// 32-bit float
    Float(f32),
    /// 64-bit integer
    Long(i64),
    /// 64-bit float
    Double(f64),
    /// A class or interface, `name_index` points at its internal name
    Class {
        /// Index of the `Utf8` name
        name_index: u16,
    },
    /// A `java.lang.String` literal
    String {
        /// Index of the `Utf8` content
        string_index: u16,
    },
    /// A field reference
    Fieldref {
        /// Index of the owning `Class`
        class_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// A class method reference
    Methodref {
        /// Index of the owning `Class`
        class_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// An interface method reference
    InterfaceMethodref {
        /// Index of the owning `Class`
        class_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// A name and descriptor pair
    NameAndType {
        /// Index of the `Utf8` name
        name_index: u16,
        /// Index of the `Utf8` descriptor
        descriptor_index: u16,
    },
    /// A method handle
    MethodHandle {
        /// Kind of the handle, `1..=9`
        reference_kind: u8,
        /// Index of the referenced member
        reference_index: u16,
    },
    /// A method type
    MethodType {
        /// Index of the `Utf8` descriptor
        descriptor_index: u16,
    },
    /// A dynamically computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// A dynamically computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// Index of the `NameAndType`
        name_and_type_index: u16,
    },
    /// A module
    Module {
        /// Index of the `Utf8` module name
        name_index: u16,
    },
    /// A package
    Package {
        /// Index of the `Utf8` package name
        name_index: u16,
    },
}

impl Constant {
    /// Returns the tag of this entry, `None` for [`Constant::Unusable`].
    #[must_use]
    pub fn tag(&self) -> Option<ConstantTag> {
        Some(match self {
            Constant::Unusable => return None,
            Constant::Utf8(_) => ConstantTag::Utf8,
            Constant::Integer(_) => ConstantTag::Integer,
            Constant::Float(_) => ConstantTag::Float,
            Constant::Long(_) => ConstantTag::Long,
            Constant::Double(_) => ConstantTag::Double,
            Constant::Class { .. } => ConstantTag::Class,
            Constant::String { .. } => ConstantTag::String,
            Constant::Fieldref { .. } => ConstantTag::Fieldref,
            Constant::Methodref { .. } => ConstantTag::Methodref,
            Constant::InterfaceMethodref { .. } => ConstantTag::InterfaceMethodref,
            Constant::NameAndType { .. } => ConstantTag::NameAndType,
            Constant::MethodHandle { .. } => ConstantTag::MethodHandle,
            Constant::MethodType { .. } => ConstantTag::MethodType,
            Constant::Dynamic { .. } => ConstantTag::Dynamic,
            Constant::InvokeDynamic { .. } => ConstantTag::InvokeDynamic,
            Constant::Module { .. } => ConstantTag::Module,
            Constant::Package { .. } => ConstantTag::Package,
        })
    }
}

/// A method reference resolved through the constant pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodRef<'a> {
    /// Internal name of the owning class, array classes in descriptor form
    pub owner: &'a str,
    /// Method name
    pub name: &'a str,
    /// Raw method descriptor
    pub descriptor: &'a str,
    /// `true` if the entry was an `InterfaceMethodref`
    pub interface: bool,
}

/// The constant pool of one class file.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    /// Reads `constant_pool_count` followed by the pool entries.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an unknown tag or count `0`, and
    /// [`crate::Error::OutOfBounds`] if the data is truncated.
    pub fn parse(parser: &mut Parser) -> Result<ConstantPool> {
        let count = parser.read_be::<u16>()?;
        if count == 0 {
            return Err(malformed_error!("Constant pool count is 0"));
        }

        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Constant::Unusable);

        while entries.len() < count as usize {
            let index = entries.len();
            let raw_tag = parser.read_be::<u8>()?;
            let Some(tag) = ConstantTag::from_repr(raw_tag) else {
                return Err(malformed_error!(
                    "Invalid constant pool tag {} at index {}",
                    raw_tag,
                    index
                ));
            };

            let constant = match tag {
                ConstantTag::Utf8 => {
                    let len = parser.read_be::<u16>()?;
                    Constant::Utf8(parser.read_string_mutf8(len as usize)?)
                }
                ConstantTag::Integer => Constant::Integer(parser.read_be::<i32>()?),
                ConstantTag::Float => Constant::Float(parser.read_be::<f32>()?),
                ConstantTag::Long => Constant::Long(parser.read_be::<i64>()?),
                ConstantTag::Double => Constant::Double(parser.read_be::<f64>()?),
                ConstantTag::Class => Constant::Class {
                    name_index: parser.read_be::<u16>()?,
                },
                ConstantTag::String => Constant::String {
                    string_index: parser.read_be::<u16>()?,
                },
                ConstantTag::Fieldref => Constant::Fieldref {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                ConstantTag::Methodref => Constant::Methodref {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                ConstantTag::InterfaceMethodref => Constant::InterfaceMethodref {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                ConstantTag::NameAndType => Constant::NameAndType {
                    name_index: parser.read_be::<u16>()?,
                    descriptor_index: parser.read_be::<u16>()?,
                },
                ConstantTag::MethodHandle => Constant::MethodHandle {
                    reference_kind: parser.read_be::<u8>()?,
                    reference_index: parser.read_be::<u16>()?,
                },
                ConstantTag::MethodType => Constant::MethodType {
                    descriptor_index: parser.read_be::<u16>()?,
                },
                ConstantTag::Dynamic => Constant::Dynamic {
                    bootstrap_method_attr_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                ConstantTag::InvokeDynamic => Constant::InvokeDynamic {
                    bootstrap_method_attr_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                ConstantTag::Module => Constant::Module {
                    name_index: parser.read_be::<u16>()?,
                },
                ConstantTag::Package => Constant::Package {
                    name_index: parser.read_be::<u16>()?,
                },
            };

            let wide = matches!(constant, Constant::Long(_) | Constant::Double(_));
            entries.push(constant);
            if wide {
                // The slot after an eight-byte constant is never referenced
                if entries.len() >= count as usize {
                    return Err(malformed_error!(
                        "Eight-byte constant at index {} overruns the pool",
                        index
                    ));
                }
                entries.push(Constant::Unusable);
            }
        }

        Ok(ConstantPool { entries })
    }

    /// Number of slots, equal to `constant_pool_count` (including slot `0`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the pool has no usable entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Returns the entry at `index`, `None` if out of range.
    #[must_use]
    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.entries.get(index as usize)
    }

    /// Iterates over `(index, entry)` pairs, skipping unusable slots.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, c)| !matches!(c, Constant::Unusable))
            .map(|(i, c)| (i as u16, c))
    }

    fn entry(&self, index: u16) -> Result<&Constant> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => Err(malformed_error!(
                "Constant pool index {} is not a usable entry",
                index
            )),
            Some(constant) => Ok(constant),
        }
    }

    /// Returns the text of the `Utf8` entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or not a `Utf8` entry.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.entry(index)? {
            Constant::Utf8(value) => Ok(value),
            other => Err(wrong_tag(index, ConstantTag::Utf8, other)),
        }
    }

    /// Returns the internal name of the `Class` entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid, not a `Class` entry, or its
    /// name is not a `Utf8` entry.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.entry(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            other => Err(wrong_tag(index, ConstantTag::Class, other)),
        }
    }

    /// Returns the `(name, descriptor)` pair of the `NameAndType` entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or the entries do not have
    /// the expected tags.
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.entry(index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            other => Err(wrong_tag(index, ConstantTag::NameAndType, other)),
        }
    }

    /// Resolves the `Methodref` or `InterfaceMethodref` entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid, the entry is not a method
    /// reference, or any entry it points to has the wrong tag.
    pub fn method_ref(&self, index: u16) -> Result<MethodRef<'_>> {
        let (class_index, name_and_type_index, interface) = match self.entry(index)? {
            Constant::Methodref {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index, false),
            Constant::InterfaceMethodref {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index, true),
            other => return Err(wrong_tag(index, ConstantTag::Methodref, other)),
        };

        let owner = self.class_name(class_index)?;
        let (name, descriptor) = self.name_and_type(name_and_type_index)?;

        Ok(MethodRef {
            owner,
            name,
            descriptor,
            interface,
        })
    }

    /// Returns the `(name, descriptor)` of the `InvokeDynamic` entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or the entries do not have
    /// the expected tags.
    pub fn invoke_dynamic(&self, index: u16) -> Result<(&str, &str)> {
        match self.entry(index)? {
            Constant::InvokeDynamic {
                name_and_type_index,
                ..
            } => self.name_and_type(*name_and_type_index),
            other => Err(wrong_tag(index, ConstantTag::InvokeDynamic, other)),
        }
    }
}

fn wrong_tag(index: u16, expected: ConstantTag, found: &Constant) -> crate::Error {
    match found.tag() {
        Some(tag) => malformed_error!(
            "Constant pool index {} is {}, expected {}",
            index,
            tag,
            expected
        ),
        None => malformed_error!("Constant pool index {} is unusable", index),
    }
}
