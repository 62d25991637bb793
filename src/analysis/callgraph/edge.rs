//! Call edges and their textual line format.
//!
//! A [`CallEdge`] connects a calling method to the method reference one of its `invoke*`
//! instructions names. Edges render to the line format consumed by downstream graph tools:
//!
//! ```text
//! <callerType> <callerMethod> <calleeType> <calleeMethod> <calleeSignature>
//! ```
//!
//! Fields are separated by [`FIELD_SEPARATOR`]. Type names are dotted binary names; the callee
//! signature is rendered according to the selected [`SignatureStyle`].
//!
//! The class format allows spaces and line breaks in names (Kotlin test methods such as
//! `` `max is symmetric` `` keep them), so every field goes through [`escape_field`]. A line
//! therefore always splits into exactly five fields on the separator:
//!
//! | Character | Written as |
//! |---|---|
//! | `\` | `\\` |
//! | space | `\s` |
//! | tab | `\t` |
//! | line feed | `\n` |
//! | carriage return | `\r` |

use std::{borrow::Cow, fmt, io::Write};

use crate::{
    analysis::callgraph::{CallSite, InvokeKind},
    classfile::descriptor::{binary_name, readable_class_name, readable_signature},
    Error, Result,
};

/// Separator between the fields of an edge line.
pub const FIELD_SEPARATOR: &str = " ";

/// Escapes the characters that would break the line format, see the [module docs](self).
///
/// Names without such characters are returned unchanged.
///
/// ```rust
/// use javacg::analysis::callgraph::escape_field;
///
/// assert_eq!(escape_field("max"), "max");
/// assert_eq!(escape_field("max is symmetric"), "max\\sis\\ssymmetric");
/// assert_eq!(escape_field("a\\b"), "a\\\\b");
/// ```
#[must_use]
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if !field.contains(['\\', ' ', '\t', '\n', '\r']) {
        return Cow::Borrowed(field);
    }

    let mut escaped = String::with_capacity(field.len() + 8);
    for c in field.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ' ' => escaped.push_str("\\s"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// How callee types and signatures are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SignatureStyle {
    /// Java source form, e.g. `(int,int)int`, arrays as `java.lang.String[]`.
    #[default]
    Readable,
    /// The raw JVM descriptor, e.g. `(II)I`.
    Descriptor,
}

/// One edge of the static call graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallEdge {
    /// Binary name of the calling class.
    pub caller_type: String,
    /// Name of the calling method.
    pub caller_method: String,
    /// Internal name of the callee's owning type, as stored in the constant pool.
    pub callee_owner: String,
    /// Name of the called method.
    pub callee_method: String,
    /// Raw descriptor of the called method.
    pub callee_descriptor: String,
    /// Kind of the invocation instruction.
    pub kind: InvokeKind,
}

impl CallEdge {
    /// Creates the edge from a caller to the target of `site`.
    #[must_use]
    pub fn new(caller_type: &str, caller_method: &str, site: CallSite) -> Self {
        CallEdge {
            caller_type: caller_type.to_string(),
            caller_method: caller_method.to_string(),
            callee_owner: site.owner,
            callee_method: site.name,
            callee_descriptor: site.descriptor,
            kind: site.kind,
        }
    }

    /// The callee's owning type, e.g. `java.lang.Math`.
    ///
    /// Array owners (`[Ljava/lang/Object;`) render as `java.lang.Object[]` in the readable style
    /// and as `[Ljava.lang.Object;` in the descriptor style.
    #[must_use]
    pub fn callee_type(&self, style: SignatureStyle) -> String {
        match style {
            SignatureStyle::Readable => readable_class_name(&self.callee_owner),
            SignatureStyle::Descriptor => binary_name(&self.callee_owner),
        }
    }

    /// The callee's signature in the given style.
    ///
    /// Descriptors are validated when a class is parsed; one that still fails to parse is
    /// rendered raw.
    #[must_use]
    pub fn callee_signature(&self, style: SignatureStyle) -> Cow<'_, str> {
        match style {
            SignatureStyle::Readable => match readable_signature(&self.callee_descriptor) {
                Ok(signature) => Cow::Owned(signature),
                Err(_) => Cow::Borrowed(&self.callee_descriptor),
            },
            SignatureStyle::Descriptor => Cow::Borrowed(&self.callee_descriptor),
        }
    }

    /// Renders the edge as one output line, without the terminating newline.
    ///
    /// Each field is passed through [`escape_field`].
    #[must_use]
    pub fn to_line(&self, style: SignatureStyle) -> String {
        let callee_type = self.callee_type(style);
        let callee_signature = self.callee_signature(style);

        [
            escape_field(&self.caller_type),
            escape_field(&self.caller_method),
            escape_field(&callee_type),
            escape_field(&self.callee_method),
            escape_field(&callee_signature),
        ]
        .join(FIELD_SEPARATOR)
    }

    /// Writes the edge line followed by `\n`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutputError`] if writing to `out` fails.
    pub fn write_line<W: Write + ?Sized>(&self, out: &mut W, style: SignatureStyle) -> Result<()> {
        writeln!(out, "{}", self.to_line(style)).map_err(Error::OutputError)
    }
}

impl fmt::Display for CallEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line(SignatureStyle::Readable))
    }
}
