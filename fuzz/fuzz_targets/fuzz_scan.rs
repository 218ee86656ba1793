#![no_main]

use imgextr_core::{scan, ScanConfig, StreamSource, JPEG, PNG};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks a small block size; the rest is the input.
    let (size_byte, buf) = data.split_at(1);
    let block_size = 1 + size_byte[0] as usize % 64;

    for descriptor in [&JPEG, &PNG] {
        let reference = scan(StreamSource::new(buf), ScanConfig::analyze(descriptor), &mut ())
            .expect("in-memory scan cannot fail");
        let config = ScanConfig::analyze(descriptor).with_block_size(block_size);
        let chunked = scan(StreamSource::new(buf), config, &mut ())
            .expect("in-memory scan cannot fail");

        assert_eq!(reference.images, chunked.images);
        assert_eq!(reference.unterminated, chunked.unterminated);
        assert_eq!(reference.headers_dropped, chunked.headers_dropped);
        assert_eq!(reference.bytes_scanned, buf.len() as u64);

        for image in &reference.images {
            assert!(image.start < image.end);
            assert!(image.end < buf.len() as u64);
        }
    }
});
