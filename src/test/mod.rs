mod jars;

pub use jars::*;

use crate::{
    classfile::builder::ClassFileBuilder,
    disassembler::OPCODE_INVOKEVIRTUAL,
};

// Class with calls into its own package and into the JDK:
//   <init>  -> java.lang.Object.<init> (special)
//   run     -> com.acme.Service.helper (virtual), java.io.PrintStream.println (virtual),
//              java.util.List.size (interface), com.acme.Service.helper (virtual)
//   helper  -> com.acme.Util.helper (static)
pub fn fixture_calls() -> Vec<u8> {
    ClassFileBuilder::new("com/acme/Service")
        .method("<init>", "()V", |code| {
            code.aload(0)
                .invokespecial("java/lang/Object", "<init>", "()V")
                .return_void();
        })
        .method("run", "(Ljava/util/List;)V", |code| {
            code.aload(0)
                .iconst(1)
                .invokevirtual("com/acme/Service", "helper", "(I)I")
                .pop()
                .aload(2)
                .aload(3)
                .invokevirtual("java/io/PrintStream", "println", "(Ljava/lang/String;)V")
                .aload(1)
                .invokeinterface("java/util/List", "size", "()I")
                .pop()
                .aload(0)
                .iconst(2)
                .invokevirtual("com/acme/Service", "helper", "(I)I")
                .pop()
                .return_void();
        })
        .method("helper", "(I)I", |code| {
            code.iload(1)
                .invokestatic("com/acme/Util", "helper", "(I)I")
                .ireturn();
        })
        .build()
}

// Class whose methods contain no call instructions
pub fn fixture_no_calls() -> Vec<u8> {
    ClassFileBuilder::new("com/acme/Plain")
        .field("value", "I")
        .method("value", "()I", |code| {
            code.iconst(5).ireturn();
        })
        .abstract_method("compute", "(J)J")
        .build()
}

// Class calling java.lang.Math.max from com.acme.Foo.bar
pub fn fixture_math() -> Vec<u8> {
    ClassFileBuilder::new("com/acme/Foo")
        .method("bar", "()V", |code| {
            code.iconst(1)
                .iconst(2)
                .invokestatic("java/lang/Math", "max", "(II)I")
                .pop()
                .return_void();
        })
        .build()
}

// Class whose only call instruction points at a Utf8 constant
pub fn fixture_malformed() -> Vec<u8> {
    ClassFileBuilder::new("com/acme/Broken")
        .method("bar", "()V", |code| {
            let index = code.utf8("not a method");
            code.invoke_raw(OPCODE_INVOKEVIRTUAL, index).return_void();
        })
        .build()
}
