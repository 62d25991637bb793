//! Integration tests for class decoding and call edge extraction.
//!
//! Classes are assembled with the public builder so every test controls the exact bytecode,
//! including the padded switch instructions and `wide` prefixes a compiler would emit.

use javacg::{classfile::builder::ClassFileBuilder, prelude::*};

/// `dispatch(int)` switches over its argument and calls a different static method per case.
fn dispatcher() -> Vec<u8> {
    ClassFileBuilder::new("com/acme/Dispatcher")
        .method("dispatch", "(I)V", |code| {
            code.iload(1);

            let at = code.len();
            let pad = (4 - (at + 1) % 4) % 4;
            let cases = at + 1 + pad + 12 + 8;
            let relative = |target: usize| ((target - at) as i32).to_be_bytes();

            code.op(0xAA).bytes(&vec![0; pad]);
            code.bytes(&relative(cases + 8))
                .bytes(&0_i32.to_be_bytes())
                .bytes(&1_i32.to_be_bytes())
                .bytes(&relative(cases))
                .bytes(&relative(cases + 4));

            code.invokestatic("com/acme/Handlers", "first", "()V")
                .return_void()
                .invokestatic("org/example/Handlers", "second", "()V")
                .return_void()
                .return_void();
        })
        .method("bump", "()V", |code| {
            // wide iinc 256, 16 ahead of a call
            code.bytes(&[0xC4, 0x84, 0x01, 0x00, 0x00, 0x10])
                .invokestatic("java/lang/Thread", "yield", "()V")
                .return_void();
        })
        .method("lambda", "()Ljava/lang/Runnable;", |code| {
            code.invokedynamic("run", "()Ljava/lang/Runnable;").areturn();
        })
        .build()
}

fn guarded() -> Vec<u8> {
    ClassFileBuilder::new("com/acme/Guarded")
        .method("close", "(Ljava/io/Closeable;)V", |code| {
            code.aload(1)
                .invokeinterface("java/io/Closeable", "close", "()V")
                .return_void()
                .aload(0)
                .invokestatic("java/util/Objects", "requireNonNull", "(Ljava/lang/Object;)Ljava/lang/Object;")
                .pop()
                .return_void()
                .exception_handler(0, 7, 8, Some("java/io/IOException"));
        })
        .build()
}

#[test]
fn switch_targets_are_followed() -> Result<()> {
    let class = ClassFile::parse(&dispatcher())?;
    let filter = PackageFilter::default();

    let lines = CallExtractor::new(&filter).extract_lines(&class, SignatureStyle::Readable)?;

    assert_eq!(
        lines,
        [
            "com.acme.Dispatcher dispatch com.acme.Handlers first ()void",
            "com.acme.Dispatcher dispatch org.example.Handlers second ()void",
            "com.acme.Dispatcher bump java.lang.Thread yield ()void",
        ]
    );

    let dispatch = &class.methods[0];
    let switch = &dispatch.instructions()[1];
    assert_eq!(switch.mnemonic, "tableswitch");
    assert!(matches!(&switch.operand, Operand::TableSwitch { offsets, .. } if offsets.len() == 2));
    Ok(())
}

#[test]
fn both_switch_cases_are_extracted() -> Result<()> {
    let class = ClassFile::parse(&dispatcher())?;
    let filter = PackageFilter::default();

    let edges = CallExtractor::new(&filter).extract(&class)?;

    let callees: Vec<_> = edges
        .iter()
        .map(|edge| (edge.callee_type(SignatureStyle::Readable), edge.callee_method.as_str()))
        .collect();
    assert_eq!(
        callees,
        [
            ("com.acme.Handlers".to_string(), "first"),
            ("org.example.Handlers".to_string(), "second"),
            ("java.lang.Thread".to_string(), "yield"),
        ]
    );
    assert!(edges.iter().all(|edge| edge.kind == InvokeKind::Static));
    Ok(())
}

#[test]
fn filter_selects_by_callee_type() -> Result<()> {
    let class = ClassFile::parse(&dispatcher())?;
    let filter = PackageFilter::from_list("org.example,java.lang.Th");

    let lines = CallExtractor::new(&filter).extract_lines(&class, SignatureStyle::Descriptor)?;

    assert_eq!(
        lines,
        [
            "com.acme.Dispatcher dispatch org.example.Handlers second ()V",
            "com.acme.Dispatcher bump java.lang.Thread yield ()V",
        ]
    );
    Ok(())
}

#[test]
fn invokedynamic_produces_no_edge() -> Result<()> {
    let class = ClassFile::parse(&dispatcher())?;
    let filter = PackageFilter::default();

    let lambda = &class.methods[2];
    assert_eq!(lambda.name, "lambda");
    assert!(lambda.instructions()[0].is_invocation());

    let edges = CallExtractor::new(&filter).extract(&class)?;
    assert!(edges.iter().all(|edge| edge.caller_method != "lambda"));
    Ok(())
}

#[test]
fn handler_code_is_scanned() -> Result<()> {
    let class = ClassFile::parse(&guarded())?;
    let filter = PackageFilter::default();

    let method = &class.methods[0];
    let code = method.code.as_ref().expect("close has code");
    assert_eq!(code.exception_table.len(), 1);

    let lines = CallExtractor::new(&filter).extract_lines(&class, SignatureStyle::Readable)?;
    assert_eq!(
        lines,
        [
            "com.acme.Guarded close java.io.Closeable close ()void",
            "com.acme.Guarded close java.util.Objects requireNonNull (java.lang.Object)java.lang.Object",
        ]
    );
    Ok(())
}

#[test]
fn interface_without_code_has_no_edges() -> Result<()> {
    let bytes = ClassFileBuilder::new("com/acme/Api")
        .access(ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT)
        .abstract_method("call", "([[Ljava/lang/String;J)V")
        .build();

    let class = ClassFile::parse(&bytes)?;
    assert!(class.access.contains(ClassAccessFlags::INTERFACE));

    let filter = PackageFilter::default();
    assert!(CallExtractor::new(&filter).extract(&class)?.is_empty());
    Ok(())
}

#[test]
fn truncated_class_is_rejected() {
    let bytes = dispatcher();

    for len in [0, 3, 10, bytes.len() / 2, bytes.len() - 1] {
        assert!(ClassFile::parse(&bytes[..len]).is_err(), "length {len} accepted");
    }
}

#[test]
fn bad_magic_is_rejected() {
    let mut bytes = dispatcher();
    bytes[0] = 0xCB;

    assert!(matches!(
        ClassFile::parse(&bytes),
        Err(Error::InvalidMagic(0xCBFE_BABE))
    ));
}

#[test]
fn method_names_with_spaces_stay_one_field() -> Result<()> {
    let bytes = ClassFileBuilder::new("com/acme/FooTest")
        .method("max is symmetric", "()V", |code| {
            code.iconst(1)
                .iconst(2)
                .invokestatic("java/lang/Math", "max", "(II)I")
                .pop()
                .return_void();
        })
        .build();

    let class = ClassFile::parse(&bytes)?;
    let filter = PackageFilter::default();
    let lines = CallExtractor::new(&filter).extract_lines(&class, SignatureStyle::Readable)?;

    assert_eq!(lines, ["com.acme.FooTest max\\sis\\ssymmetric java.lang.Math max (int,int)int"]);

    let fields: Vec<&str> = lines[0].split(javacg::analysis::callgraph::FIELD_SEPARATOR).collect();
    assert_eq!(fields.len(), 5);
    assert_eq!(fields[1], "max\\sis\\ssymmetric");
    Ok(())
}
