//! Programmatic construction of class files.
//!
//! [`ClassFileBuilder`] assembles syntactically valid class file bytes without a Java compiler.
//! It is used for test fixtures, benchmarks and fuzzing seeds, and by tools that need small
//! synthetic classes. Constant pool entries are interned, so referring to the same method twice
//! reuses one `Methodref`.
//!
//! The builder does not compute stack maps or verify bytecode; it produces exactly the bytes it
//! is told to.
//!
//! # Examples
//!
//! ```rust
//! use javacg::classfile::builder::ClassFileBuilder;
//!
//! let bytes = ClassFileBuilder::new("com/acme/Foo")
//!     .method("<init>", "()V", |code| {
//!         code.aload(0)
//!             .invokespecial("java/lang/Object", "<init>", "()V")
//!             .return_void();
//!     })
//!     .method("bar", "()V", |code| {
//!         code.iconst(1)
//!             .iconst(2)
//!             .invokestatic("java/lang/Math", "max", "(II)I")
//!             .pop()
//!             .return_void();
//!     })
//!     .build();
//!
//! assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
//! ```

use std::collections::HashMap;

use crate::{
    analysis::callgraph::InvokeKind,
    classfile::{
        descriptor::MethodDescriptor,
        flags::{ClassAccessFlags, MethodAccessFlags},
    },
    disassembler::OPCODE_INVOKEDYNAMIC,
};

#[derive(Default)]
struct PoolBuilder {
    data: Vec<u8>,
    interned: HashMap<Vec<u8>, u16>,
    next: u16,
}

impl PoolBuilder {
    fn new() -> Self {
        PoolBuilder {
            next: 1,
            ..Default::default()
        }
    }

    fn intern(&mut self, entry: Vec<u8>) -> u16 {
        if let Some(index) = self.interned.get(&entry) {
            return *index;
        }

        let index = self.next;
        self.next += 1;
        self.data.extend_from_slice(&entry);
        self.interned.insert(entry, index);
        index
    }

    fn utf8(&mut self, value: &str) -> u16 {
        let mut entry = vec![1];
        entry.extend_from_slice(&encode_mutf8(value));
        self.intern(entry)
    }

    fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.intern(tagged(7, &[name_index]))
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.intern(tagged(12, &[name_index, descriptor_index]))
    }

    fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str, interface: bool) -> u16 {
        let class_index = self.class(owner);
        let name_and_type_index = self.name_and_type(name, descriptor);
        let tag = if interface { 11 } else { 10 };
        self.intern(tagged(tag, &[class_index, name_and_type_index]))
    }

    fn invoke_dynamic(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.intern(tagged(18, &[0, name_and_type_index]))
    }
}

fn tagged(tag: u8, indices: &[u16]) -> Vec<u8> {
    let mut entry = vec![tag];
    for index in indices {
        entry.extend_from_slice(&index.to_be_bytes());
    }
    entry
}

/// Encodes `value` as a length-prefixed modified UTF-8 string.
fn encode_mutf8(value: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => bytes.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                bytes.push(0xC0 | (unit >> 6) as u8);
                bytes.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                bytes.push(0xE0 | (unit >> 12) as u8);
                bytes.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                bytes.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }

    let mut encoded = (bytes.len() as u16).to_be_bytes().to_vec();
    encoded.extend_from_slice(&bytes);
    encoded
}

/// Emits the bytecode of one method body.
///
/// Handed to the closure passed to [`ClassFileBuilder::method`]. Every emitting method returns
/// `&mut Self` for chaining.
pub struct CodeBuilder<'a> {
    pool: &'a mut PoolBuilder,
    code: Vec<u8>,
    handlers: Vec<u8>,
    handler_count: u16,
    max_stack: u16,
    max_locals: u16,
}

impl CodeBuilder<'_> {
    /// Adds a `Utf8` constant and returns its index.
    pub fn utf8(&mut self, value: &str) -> u16 {
        self.pool.utf8(value)
    }

    /// Adds a `Class` constant and returns its index.
    pub fn class(&mut self, internal_name: &str) -> u16 {
        self.pool.class(internal_name)
    }

    /// Adds a `Methodref` (or `InterfaceMethodref`) constant and returns its index.
    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str, interface: bool) -> u16 {
        self.pool.method_ref(owner, name, descriptor, interface)
    }

    /// Appends raw bytecode.
    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.code.extend_from_slice(bytes);
        self
    }

    /// Appends a single opcode without operands.
    pub fn op(&mut self, opcode: u8) -> &mut Self {
        self.code.push(opcode);
        self
    }

    /// Pushes an int constant using `iconst_<n>` or `bipush`.
    pub fn iconst(&mut self, value: i8) -> &mut Self {
        match value {
            -1..=5 => self.op((0x03 + value) as u8),
            _ => self.bytes(&[0x10, value as u8]),
        }
    }

    /// `iload <slot>`
    pub fn iload(&mut self, slot: u8) -> &mut Self {
        self.bytes(&[0x15, slot])
    }

    /// `aload <slot>`
    pub fn aload(&mut self, slot: u8) -> &mut Self {
        self.bytes(&[0x19, slot])
    }

    /// `pop`
    pub fn pop(&mut self) -> &mut Self {
        self.op(0x57)
    }

    /// `new <class>`
    pub fn new_object(&mut self, internal_name: &str) -> &mut Self {
        let index = self.pool.class(internal_name);
        self.invoke_raw(0xBB, index)
    }

    /// `dup`
    pub fn dup(&mut self) -> &mut Self {
        self.op(0x59)
    }

    /// `invokevirtual` of a class method.
    pub fn invokevirtual(&mut self, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        self.invoke(InvokeKind::Virtual, owner, name, descriptor)
    }

    /// `invokespecial` of a class method.
    pub fn invokespecial(&mut self, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        self.invoke(InvokeKind::Special, owner, name, descriptor)
    }

    /// `invokestatic` of a class method.
    pub fn invokestatic(&mut self, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        self.invoke(InvokeKind::Static, owner, name, descriptor)
    }

    /// `invokeinterface` of an interface method.
    pub fn invokeinterface(&mut self, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        self.invoke(InvokeKind::Interface, owner, name, descriptor)
    }

    /// Emits the invoke instruction of `kind`.
    ///
    /// `Interface` references an `InterfaceMethodref` and appends the argument slot count
    /// derived from the descriptor, plus the receiver, and the trailing zero byte.
    pub fn invoke(
        &mut self,
        kind: InvokeKind,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> &mut Self {
        let interface = kind == InvokeKind::Interface;
        let index = self.pool.method_ref(owner, name, descriptor, interface);
        self.invoke_raw(kind.opcode(), index);

        if interface {
            let count = MethodDescriptor::parse(descriptor)
                .map_or(1, |d| d.parameter_slots() + 1)
                .min(u8::MAX as usize) as u8;
            self.bytes(&[count, 0]);
        }
        self
    }

    /// `invokedynamic` with a placeholder bootstrap method.
    pub fn invokedynamic(&mut self, name: &str, descriptor: &str) -> &mut Self {
        let index = self.pool.invoke_dynamic(name, descriptor);
        self.op(OPCODE_INVOKEDYNAMIC);
        self.code.extend_from_slice(&index.to_be_bytes());
        self.bytes(&[0, 0])
    }

    /// Emits `opcode` followed by a two-byte constant pool index.
    pub fn invoke_raw(&mut self, opcode: u8, index: u16) -> &mut Self {
        self.op(opcode);
        self.code.extend_from_slice(&index.to_be_bytes());
        self
    }

    /// `return`
    pub fn return_void(&mut self) -> &mut Self {
        self.op(0xB1)
    }

    /// `ireturn`
    pub fn ireturn(&mut self) -> &mut Self {
        self.op(0xAC)
    }

    /// `areturn`
    pub fn areturn(&mut self) -> &mut Self {
        self.op(0xB0)
    }

    /// `athrow`
    pub fn athrow(&mut self) -> &mut Self {
        self.op(0xBF)
    }

    /// Adds an exception table entry; `catch_type` of `None` catches everything.
    pub fn exception_handler(
        &mut self,
        start_pc: u16,
        end_pc: u16,
        handler_pc: u16,
        catch_type: Option<&str>,
    ) -> &mut Self {
        let catch_index = catch_type.map_or(0, |name| self.pool.class(name));
        for value in [start_pc, end_pc, handler_pc, catch_index] {
            self.handlers.extend_from_slice(&value.to_be_bytes());
        }
        self.handler_count += 1;
        self
    }

    /// Overrides the declared operand stack and local variable sizes.
    pub fn limits(&mut self, max_stack: u16, max_locals: u16) -> &mut Self {
        self.max_stack = max_stack;
        self.max_locals = max_locals;
        self
    }

    /// Current length of the emitted code.
    #[must_use]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns `true` if no bytecode was emitted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

/// Builder for class file bytes.
///
/// Defaults to a `public` class of version 52.0 (Java 8) extending `java/lang/Object`. All
/// names are given in internal form (`com/acme/Foo`).
pub struct ClassFileBuilder {
    pool: PoolBuilder,
    major_version: u16,
    minor_version: u16,
    access: ClassAccessFlags,
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
}

impl ClassFileBuilder {
    /// Starts a class with the given internal name.
    #[must_use]
    pub fn new(internal_name: &str) -> Self {
        ClassFileBuilder {
            pool: PoolBuilder::new(),
            major_version: 52,
            minor_version: 0,
            access: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            name: internal_name.to_string(),
            super_name: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Sets the class file version.
    #[must_use]
    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major_version = major;
        self.minor_version = minor;
        self
    }

    /// Sets the class access flags.
    #[must_use]
    pub fn access(mut self, access: ClassAccessFlags) -> Self {
        self.access = access;
        self
    }

    /// Sets the superclass.
    #[must_use]
    pub fn super_class(mut self, internal_name: &str) -> Self {
        self.super_name = Some(internal_name.to_string());
        self
    }

    /// Removes the superclass, as in `java/lang/Object` itself.
    #[must_use]
    pub fn no_super(mut self) -> Self {
        self.super_name = None;
        self
    }

    /// Adds a direct superinterface.
    #[must_use]
    pub fn interface(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    /// Adds a private field without attributes.
    #[must_use]
    pub fn field(mut self, name: &str, descriptor: &str) -> Self {
        let mut field = Vec::with_capacity(8);
        field.extend_from_slice(&0x0002_u16.to_be_bytes());
        field.extend_from_slice(&self.pool.utf8(name).to_be_bytes());
        field.extend_from_slice(&self.pool.utf8(descriptor).to_be_bytes());
        field.extend_from_slice(&0_u16.to_be_bytes());
        self.fields.push(field);
        self
    }

    /// Adds a `public` method whose body is emitted by `body`.
    #[must_use]
    pub fn method<F>(self, name: &str, descriptor: &str, body: F) -> Self
    where
        F: FnOnce(&mut CodeBuilder<'_>),
    {
        self.method_with_access(MethodAccessFlags::PUBLIC, name, descriptor, body)
    }

    /// Adds a method with explicit access flags whose body is emitted by `body`.
    #[must_use]
    pub fn method_with_access<F>(
        mut self,
        access: MethodAccessFlags,
        name: &str,
        descriptor: &str,
        body: F,
    ) -> Self
    where
        F: FnOnce(&mut CodeBuilder<'_>),
    {
        let mut code = CodeBuilder {
            pool: &mut self.pool,
            code: Vec::new(),
            handlers: Vec::new(),
            handler_count: 0,
            max_stack: 16,
            max_locals: 16,
        };
        body(&mut code);

        let CodeBuilder {
            code,
            handlers,
            handler_count,
            max_stack,
            max_locals,
            ..
        } = code;

        let mut attribute = Vec::with_capacity(12 + code.len() + handlers.len());
        attribute.extend_from_slice(&max_stack.to_be_bytes());
        attribute.extend_from_slice(&max_locals.to_be_bytes());
        attribute.extend_from_slice(&(code.len() as u32).to_be_bytes());
        attribute.extend_from_slice(&code);
        attribute.extend_from_slice(&handler_count.to_be_bytes());
        attribute.extend_from_slice(&handlers);
        attribute.extend_from_slice(&0_u16.to_be_bytes());

        let mut method = self.method_header(access, name, descriptor, 1);
        method.extend_from_slice(&self.pool.utf8("Code").to_be_bytes());
        method.extend_from_slice(&(attribute.len() as u32).to_be_bytes());
        method.extend_from_slice(&attribute);
        self.methods.push(method);
        self
    }

    /// Adds a `public abstract` method without a body.
    #[must_use]
    pub fn abstract_method(mut self, name: &str, descriptor: &str) -> Self {
        let method = self.method_header(
            MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT,
            name,
            descriptor,
            0,
        );
        self.methods.push(method);
        self
    }

    fn method_header(
        &mut self,
        access: MethodAccessFlags,
        name: &str,
        descriptor: &str,
        attribute_count: u16,
    ) -> Vec<u8> {
        let mut header = Vec::with_capacity(8);
        header.extend_from_slice(&access.bits().to_be_bytes());
        header.extend_from_slice(&self.pool.utf8(name).to_be_bytes());
        header.extend_from_slice(&self.pool.utf8(descriptor).to_be_bytes());
        header.extend_from_slice(&attribute_count.to_be_bytes());
        header
    }

    /// Assembles the class file.
    #[must_use]
    pub fn build(mut self) -> Vec<u8> {
        let this_index = self.pool.class(&self.name);
        let super_index = match &self.super_name {
            Some(name) => self.pool.class(name),
            None => 0,
        };
        let interface_indices: Vec<u16> = self
            .interfaces
            .iter()
            .map(|name| self.pool.class(name))
            .collect();

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        out.extend_from_slice(&self.minor_version.to_be_bytes());
        out.extend_from_slice(&self.major_version.to_be_bytes());
        out.extend_from_slice(&self.pool.next.to_be_bytes());
        out.extend_from_slice(&self.pool.data);
        out.extend_from_slice(&self.access.bits().to_be_bytes());
        out.extend_from_slice(&this_index.to_be_bytes());
        out.extend_from_slice(&super_index.to_be_bytes());

        out.extend_from_slice(&(interface_indices.len() as u16).to_be_bytes());
        for index in interface_indices {
            out.extend_from_slice(&index.to_be_bytes());
        }

        out.extend_from_slice(&(self.fields.len() as u16).to_be_bytes());
        for field in &self.fields {
            out.extend_from_slice(field);
        }

        out.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        for method in &self.methods {
            out.extend_from_slice(method);
        }

        // No class attributes
        out.extend_from_slice(&0_u16.to_be_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::{
        classfile::{constant::Constant, ClassFile},
        Parser,
    };

    #[test]
    fn constants_are_interned() {
        let bytes = ClassFileBuilder::new("com/acme/Foo")
            .method("bar", "()V", |code| {
                code.invokestatic("java/lang/Math", "abs", "(I)I")
                    .invokestatic("java/lang/Math", "abs", "(I)I")
                    .return_void();
            })
            .build();

        let class = ClassFile::parse(&bytes).unwrap();
        let instructions = class.methods[0].instructions();
        assert_eq!(
            instructions[0].operand.constant_index(),
            instructions[1].operand.constant_index()
        );

        let method_refs = class
            .constant_pool
            .iter()
            .filter(|(_, c)| matches!(c, Constant::Methodref { .. }))
            .count();
        assert_eq!(method_refs, 1);
    }

    #[test]
    fn invokeinterface_count() {
        let bytes = ClassFileBuilder::new("com/acme/Foo")
            .method("bar", "()V", |code| {
                code.invokeinterface("java/util/Map", "put", "(Ljava/lang/Object;J)V")
                    .return_void();
            })
            .build();

        let class = ClassFile::parse(&bytes).unwrap();
        assert_eq!(
            class.methods[0].instructions()[0].operand,
            crate::disassembler::Operand::InvokeInterface {
                index: class.methods[0].instructions()[0]
                    .operand
                    .constant_index()
                    .unwrap(),
                count: 4,
            }
        );
    }

    #[test]
    fn invoke_kinds_use_their_opcode() {
        let bytes = ClassFileBuilder::new("com/acme/Foo")
            .method("bar", "()V", |code| {
                for kind in InvokeKind::iter() {
                    code.invoke(kind, "com/acme/Util", "run", "(I)V");
                }
                code.return_void();
            })
            .build();

        let class = ClassFile::parse(&bytes).unwrap();
        let instructions = class.methods[0].instructions();
        for (instruction, kind) in instructions.iter().zip(InvokeKind::iter()) {
            assert_eq!(instruction.opcode, kind.opcode());
        }
        assert_eq!(
            instructions[3].operand,
            crate::disassembler::Operand::InvokeInterface {
                index: instructions[3].operand.constant_index().unwrap(),
                count: 2,
            }
        );
    }

    #[test]
    fn exception_handlers() {
        let bytes = ClassFileBuilder::new("com/acme/Foo")
            .method("bar", "()V", |code| {
                code.return_void()
                    .athrow()
                    .exception_handler(0, 1, 1, Some("java/io/IOException"))
                    .exception_handler(0, 1, 1, None);
            })
            .build();

        let class = ClassFile::parse(&bytes).unwrap();
        let table = &class.methods[0].code.as_ref().unwrap().exception_table;
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].catch_type.as_deref(), Some("java/io/IOException"));
        assert_eq!(table[1].catch_type, None);
    }

    #[test]
    fn mutf8_encoding() {
        let encoded = encode_mutf8("a\u{0}é\u{1F600}");
        let mut parser = Parser::new(&encoded[2..]);
        assert_eq!(
            parser.read_string_mutf8(encoded.len() - 2).unwrap(),
            "a\u{0}é\u{1F600}"
        );
        assert_eq!(&encoded[3..5], &[0xC0, 0x80]);
    }
}
