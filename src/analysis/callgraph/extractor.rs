//! Extraction of call edges from decoded classes.

use log::debug;

use crate::{
    analysis::callgraph::{CallEdge, CallSite, PackageFilter, SignatureStyle},
    classfile::{descriptor::readable_class_name, method::MethodInfo, ClassFile},
    Result,
};

/// Extracts the call edges of classes, keeping only targets the filter includes.
///
/// Extraction is a pure function of the class: methods are visited in declaration order and
/// instructions in program order, so the same bytes always yield the same edges in the same
/// order. Duplicate calls produce duplicate edges.
///
/// # Examples
///
/// ```rust
/// use javacg::analysis::{CallExtractor, PackageFilter, SignatureStyle};
/// use javacg::classfile::{builder::ClassFileBuilder, ClassFile};
///
/// let bytes = ClassFileBuilder::new("com/acme/Foo")
///     .method("bar", "()V", |code| {
///         code.iconst(1)
///             .iconst(2)
///             .invokestatic("java/lang/Math", "max", "(II)I")
///             .pop()
///             .return_void();
///     })
///     .build();
/// let class = ClassFile::parse(&bytes)?;
///
/// let filter = PackageFilter::default();
/// let lines = CallExtractor::new(&filter).extract_lines(&class, SignatureStyle::Readable)?;
/// assert_eq!(lines, vec!["com.acme.Foo bar java.lang.Math max (int,int)int"]);
/// # Ok::<(), javacg::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CallExtractor<'a> {
    filter: &'a PackageFilter,
}

impl<'a> CallExtractor<'a> {
    /// Creates an extractor using `filter` for call targets.
    #[must_use]
    pub fn new(filter: &'a PackageFilter) -> Self {
        CallExtractor { filter }
    }

    /// Returns the edges of every call instruction in `class`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a call instruction references an invalid constant
    /// pool entry. [`ClassFile::parse`] rejects such classes, so this only happens for classes
    /// assembled by other means.
    pub fn extract(&self, class: &ClassFile) -> Result<Vec<CallEdge>> {
        let mut edges = Vec::new();
        for method in &class.methods {
            self.extract_method(class, method, &mut edges)?;
        }

        debug!("Extracted {} edges from {}", edges.len(), class.name);
        Ok(edges)
    }

    /// Returns the edges of `class` rendered as output lines, without newlines.
    ///
    /// # Errors
    /// See [`CallExtractor::extract`].
    pub fn extract_lines(&self, class: &ClassFile, style: SignatureStyle) -> Result<Vec<String>> {
        Ok(self
            .extract(class)?
            .iter()
            .map(|edge| edge.to_line(style))
            .collect())
    }

    fn extract_method(
        &self,
        class: &ClassFile,
        method: &MethodInfo,
        edges: &mut Vec<CallEdge>,
    ) -> Result<()> {
        for instruction in method.instructions() {
            let Some(site) = CallSite::resolve(instruction, &class.constant_pool)? else {
                continue;
            };

            if self.filter.is_excluded(&readable_class_name(&site.owner)) {
                continue;
            }

            edges.push(CallEdge::new(&class.name, &method.name, site));
        }

        Ok(())
    }
}
