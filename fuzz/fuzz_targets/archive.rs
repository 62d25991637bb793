#![no_main]

use javacg::{
    analysis::PackageFilter,
    archive::{Archive, ArchiveWalker, DecodePolicy},
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut archive) = Archive::from_mem(data.to_vec()) {
        let filter = PackageFilter::default();
        let walker = ArchiveWalker::new(&filter).decode_policy(DecodePolicy::Skip);
        let _ = walker.walk_archive(&mut archive, &mut std::io::sink());
    }
});
