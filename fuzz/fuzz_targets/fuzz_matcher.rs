#![no_main]

use imgextr_core::{SignatureMatcher, JPEG, PNG};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks where the input is split; the rest is scanned.
    let (split_byte, buf) = data.split_at(1);
    let split = split_byte[0] as usize % (buf.len() + 1);

    for signature in [JPEG.header(), JPEG.trailer(), PNG.header(), PNG.trailer()] {
        let whole = SignatureMatcher::new(signature).match_ends(buf);

        // Every reported end must close a real occurrence.
        for &end in &whole {
            assert!(end + 1 >= signature.len());
            assert_eq!(&buf[end + 1 - signature.len()..=end], signature);
        }

        // Splitting the input must not lose or invent matches.
        let mut matcher = SignatureMatcher::new(signature);
        let mut split_ends = matcher.match_ends(&buf[..split]);
        split_ends.extend(matcher.match_ends(&buf[split..]).into_iter().map(|end| end + split));
        assert_eq!(whole, split_ends);
    }
});
