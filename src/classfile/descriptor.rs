//! Field and method descriptors.
//!
//! Descriptors are the class file's textual encoding of types (JVMS §4.3). This module parses
//! them and renders the Java source form used in readable call-graph output:
//!
//! | Descriptor | Readable |
//! |---|---|
//! | `I` | `int` |
//! | `Ljava/lang/String;` | `java.lang.String` |
//! | `[[J` | `long[][]` |
//! | `(ILjava/lang/Object;)V` | `(int,java.lang.Object)void` |
//!
//! Class names inside descriptors and `CONSTANT_Class` entries use the internal form with `/`
//! separators; [`binary_name`] converts them to the dotted binary name.
//!
//! # Examples
//!
//! ```rust
//! use javacg::classfile::descriptor::MethodDescriptor;
//!
//! let descriptor = MethodDescriptor::parse("([Ljava/lang/String;)V")?;
//! assert_eq!(descriptor.parameters.len(), 1);
//! assert_eq!(descriptor.to_string(), "(java.lang.String[])void");
//! # Ok::<(), javacg::Error>(())
//! ```

use std::fmt;

use crate::Result;

/// Maximum number of array dimensions a descriptor may carry.
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

/// A parsed field descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `B`
    Byte,
    /// `C`
    Char,
    /// `D`
    Double,
    /// `F`
    Float,
    /// `I`
    Int,
    /// `J`
    Long,
    /// `S`
    Short,
    /// `Z`
    Boolean,
    /// `L<internal name>;`, holding the internal name
    Object(String),
    /// `[<component>`
    Array(Box<FieldType>),
}

impl FieldType {
    /// Parses a complete field descriptor.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `descriptor` is not exactly one field type.
    pub fn parse(descriptor: &str) -> Result<FieldType> {
        let mut pos = 0;
        let field = Self::parse_at(descriptor, &mut pos)?;
        if pos != descriptor.len() {
            return Err(malformed_error!(
                "Trailing data in field descriptor '{}'",
                descriptor
            ));
        }

        Ok(field)
    }

    fn parse_at(descriptor: &str, pos: &mut usize) -> Result<FieldType> {
        let bytes = descriptor.as_bytes();

        let mut dimensions = 0;
        while bytes.get(*pos) == Some(&b'[') {
            dimensions += 1;
            *pos += 1;
        }
        if dimensions > MAX_ARRAY_DIMENSIONS {
            return Err(malformed_error!(
                "Descriptor '{}' has {} array dimensions",
                descriptor,
                dimensions
            ));
        }

        let Some(&tag) = bytes.get(*pos) else {
            return Err(malformed_error!("Truncated descriptor '{}'", descriptor));
        };
        *pos += 1;

        let mut field = match tag {
            b'B' => FieldType::Byte,
            b'C' => FieldType::Char,
            b'D' => FieldType::Double,
            b'F' => FieldType::Float,
            b'I' => FieldType::Int,
            b'J' => FieldType::Long,
            b'S' => FieldType::Short,
            b'Z' => FieldType::Boolean,
            b'L' => {
                let rest = &descriptor[*pos..];
                let Some(end) = rest.find(';') else {
                    return Err(malformed_error!(
                        "Unterminated class name in descriptor '{}'",
                        descriptor
                    ));
                };
                if end == 0 {
                    return Err(malformed_error!(
                        "Empty class name in descriptor '{}'",
                        descriptor
                    ));
                }
                *pos += end + 1;
                FieldType::Object(rest[..end].to_string())
            }
            other => {
                return Err(malformed_error!(
                    "Invalid type tag '{}' in descriptor '{}'",
                    char::from(other),
                    descriptor
                ))
            }
        };

        for _ in 0..dimensions {
            field = FieldType::Array(Box::new(field));
        }

        Ok(field)
    }

    /// Returns `true` for `long` and `double`, which occupy two local variable slots.
    #[must_use]
    pub fn is_wide(&self) -> bool {
        matches!(self, FieldType::Long | FieldType::Double)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Byte => f.write_str("byte"),
            FieldType::Char => f.write_str("char"),
            FieldType::Double => f.write_str("double"),
            FieldType::Float => f.write_str("float"),
            FieldType::Int => f.write_str("int"),
            FieldType::Long => f.write_str("long"),
            FieldType::Short => f.write_str("short"),
            FieldType::Boolean => f.write_str("boolean"),
            FieldType::Object(name) => f.write_str(&binary_name(name)),
            FieldType::Array(component) => write!(f, "{component}[]"),
        }
    }
}

/// A parsed method descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    /// Parameter types in declaration order
    pub parameters: Vec<FieldType>,
    /// Return type, `None` for `void`
    pub return_type: Option<FieldType>,
}

impl MethodDescriptor {
    /// Parses a method descriptor such as `(IJ)Ljava/lang/String;`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `descriptor` does not follow the method descriptor
    /// grammar.
    pub fn parse(descriptor: &str) -> Result<MethodDescriptor> {
        let bytes = descriptor.as_bytes();
        if bytes.first() != Some(&b'(') {
            return Err(malformed_error!(
                "Method descriptor '{}' does not start with '('",
                descriptor
            ));
        }

        let mut pos = 1;
        let mut parameters = Vec::new();
        loop {
            match bytes.get(pos) {
                Some(b')') => {
                    pos += 1;
                    break;
                }
                Some(_) => parameters.push(FieldType::parse_at(descriptor, &mut pos)?),
                None => {
                    return Err(malformed_error!(
                        "Unterminated parameter list in '{}'",
                        descriptor
                    ))
                }
            }
        }

        let return_type = if bytes.get(pos) == Some(&b'V') {
            pos += 1;
            None
        } else {
            Some(FieldType::parse_at(descriptor, &mut pos)?)
        };

        if pos != descriptor.len() {
            return Err(malformed_error!(
                "Trailing data in method descriptor '{}'",
                descriptor
            ));
        }

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }

    /// Number of local variable slots the parameters occupy, excluding `this`.
    #[must_use]
    pub fn parameter_slots(&self) -> usize {
        self.parameters
            .iter()
            .map(|p| if p.is_wide() { 2 } else { 1 })
            .sum()
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{parameter}")?;
        }
        f.write_str(")")?;
        match &self.return_type {
            Some(return_type) => write!(f, "{return_type}"),
            None => f.write_str("void"),
        }
    }
}

/// Converts an internal class name (`java/lang/Object`) to its binary name (`java.lang.Object`).
///
/// Array class names keep their descriptor form with dotted class names
/// (`[Ljava.lang.Object;`), the same as `Class.getName()` reports them.
#[must_use]
pub fn binary_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Renders the name stored in a `CONSTANT_Class` entry in Java source form.
///
/// Plain classes map to their binary name; array classes (`[I`, `[Ljava/lang/Object;`) map to
/// the component type followed by `[]` per dimension. A malformed array name falls back to
/// [`binary_name`].
#[must_use]
pub fn readable_class_name(internal: &str) -> String {
    if internal.starts_with('[') {
        if let Ok(field) = FieldType::parse(internal) {
            return field.to_string();
        }
    }

    binary_name(internal)
}

/// Renders a method descriptor in Java source form, e.g. `(int,int)int`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `descriptor` is not a valid method descriptor.
pub fn readable_signature(descriptor: &str) -> Result<String> {
    Ok(MethodDescriptor::parse(descriptor)?.to_string())
}
