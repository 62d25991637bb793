#![no_main]

use javacg::{
    analysis::{CallExtractor, PackageFilter, SignatureStyle},
    classfile::ClassFile,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(class) = ClassFile::parse(data) {
        let filter = PackageFilter::default();
        let _ = CallExtractor::new(&filter).extract_lines(&class, SignatureStyle::Readable);
    }
});
