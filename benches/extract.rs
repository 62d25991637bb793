//! Benchmarks for class decoding and call edge extraction.
//!
//! Classes are synthesized with the builder so the benchmarks need no sample archives:
//! - Descriptor parsing and rendering
//! - Class file parsing with a growing number of call sites
//! - Edge extraction with and without a package filter
//! - A full in-memory archive walk, sequential and parallel

extern crate javacg;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use javacg::{
    analysis::{CallExtractor, PackageFilter, SignatureStyle},
    archive::{Archive, ArchiveWalker},
    classfile::{builder::ClassFileBuilder, descriptor::readable_signature, ClassFile},
};
use std::{hint::black_box, io::Write};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

const OWNERS: [&str; 4] = [
    "java/lang/String",
    "java/util/List",
    "com/acme/Service",
    "org/example/Widget",
];

/// A class with `methods` methods of `calls` static calls each.
fn synthetic_class(name: &str, methods: usize, calls: usize) -> Vec<u8> {
    let mut builder = ClassFileBuilder::new(name);
    for m in 0..methods {
        builder = builder.method(&format!("m{m}"), "()V", |code| {
            for c in 0..calls {
                code.invokestatic(OWNERS[c % OWNERS.len()], &format!("t{c}"), "(IJ[Ljava/lang/String;)V");
            }
            code.return_void();
        });
    }
    builder.build()
}

fn synthetic_jar(classes: usize) -> Vec<u8> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..classes {
        let name = format!("com/acme/C{i}");
        zip.start_file(format!("{name}.class"), options).unwrap();
        zip.write_all(&synthetic_class(&name, 8, 16)).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Benchmark rendering descriptors in Java source form.
fn bench_readable_signature(c: &mut Criterion) {
    let descriptor = "(I[[JLjava/util/Map$Entry;Z)Ljava/lang/String;";

    c.bench_function("readable_signature", |b| {
        b.iter(|| black_box(readable_signature(black_box(descriptor)).unwrap()));
    });
}

/// Benchmark class parsing for growing method bodies.
fn bench_class_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("class_parse");

    for calls in [1, 16, 256] {
        let bytes = synthetic_class("com/acme/Bench", 8, calls);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(calls), &bytes, |b, bytes| {
            b.iter(|| black_box(ClassFile::parse(black_box(bytes)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark extracting edges from an already parsed class.
fn bench_extract(c: &mut Criterion) {
    let class = ClassFile::parse(&synthetic_class("com/acme/Bench", 8, 64)).unwrap();
    let all = PackageFilter::default();
    let some = PackageFilter::from_list("com.acme,org.example");

    c.bench_function("extract_unfiltered", |b| {
        let extractor = CallExtractor::new(&all);
        b.iter(|| black_box(extractor.extract_lines(&class, SignatureStyle::Readable).unwrap()));
    });

    c.bench_function("extract_filtered", |b| {
        let extractor = CallExtractor::new(&some);
        b.iter(|| black_box(extractor.extract_lines(&class, SignatureStyle::Readable).unwrap()));
    });
}

/// Benchmark walking a 64-class archive held in memory.
fn bench_walk(c: &mut Criterion) {
    let jar = synthetic_jar(64);
    let filter = PackageFilter::default();
    let mut group = c.benchmark_group("walk");
    group.throughput(Throughput::Bytes(jar.len() as u64));

    for parallel in [false, true] {
        let walker = ArchiveWalker::new(&filter).parallel(parallel);
        let id = if parallel { "parallel" } else { "sequential" };
        group.bench_function(id, |b| {
            b.iter(|| {
                let mut archive = Archive::from_mem(jar.clone()).unwrap();
                let mut out = Vec::new();
                black_box(walker.walk_archive(&mut archive, &mut out).unwrap());
                black_box(out)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_readable_signature,
    bench_class_parse,
    bench_extract,
    bench_walk,
);
criterion_main!(benches);
