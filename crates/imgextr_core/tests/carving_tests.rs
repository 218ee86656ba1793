use imgextr_core::{
    scan, FoundImage, OverflowPolicy, PendingHeader, ScanConfig, ScanSummary, StreamSource,
    IMAGE_LIMIT, JPEG, PNG,
};
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

fn create_filler(size: usize, seed: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state = seed as u32;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        // Keep filler below 0x80 so it never contains signature bytes.
        data.push(((state >> 16) as u8) & 0x7F);
    }
    data
}

fn create_jpeg(body_len: usize, seed: u8) -> Vec<u8> {
    [JPEG.header(), &create_filler(body_len, seed)[..], JPEG.trailer()].concat()
}

fn create_png(body_len: usize, seed: u8) -> Vec<u8> {
    [PNG.header(), &create_filler(body_len, seed)[..], PNG.trailer()].concat()
}

fn analyze_jpeg(data: &[u8]) -> ScanSummary {
    scan(StreamSource::new(data), ScanConfig::analyze(&JPEG), &mut ()).unwrap()
}

#[test]
fn test_single_image_bounds() {
    let image = create_jpeg(2000, 1);
    let data = [&create_filler(300, 2)[..], &image[..], &create_filler(700, 3)[..]].concat();

    let summary = analyze_jpeg(&data);

    assert_eq!(summary.images_found, 1);
    assert_eq!(
        summary.images,
        vec![FoundImage {
            id: 1,
            start: 300,
            end: 300 + image.len() as u64 - 1
        }]
    );
}

#[test]
fn test_back_to_back_extraction() {
    let dir = TempDir::new().unwrap();
    let first = create_png(1500, 4);
    let second = create_png(90, 5);
    let data = [&first[..], &create_filler(10, 6)[..], &second[..]].concat();

    let summary = scan(
        StreamSource::new(&data[..]),
        ScanConfig::extract(&PNG, dir.path()),
        &mut (),
    )
    .unwrap();

    assert_eq!(summary.images_found, 2);
    let (a, b) = (summary.images[0], summary.images[1]);
    assert_eq!((a.start, a.end), (0, first.len() as u64 - 1));
    assert!(a.end < b.start);
    assert_eq!(b.end, data.len() as u64 - 1);

    assert_eq!(fs::read(dir.path().join("1.png")).unwrap(), first);
    assert_eq!(fs::read(dir.path().join("2.png")).unwrap(), second);
    assert_eq!(summary.extracted.len(), 2);
    assert!(summary.partial_files.is_empty());
}

#[test]
fn test_nested_extraction() {
    let dir = TempDir::new().unwrap();
    let outer_head = create_filler(700, 7);
    let inner = create_jpeg(900, 8);
    let outer_tail = create_filler(400, 9);

    let data = [
        JPEG.header(),
        &outer_head[..],
        &inner[..],
        &outer_tail[..],
        JPEG.trailer(),
    ]
    .concat();

    let summary = scan(
        StreamSource::new(&data[..]),
        ScanConfig::extract(&JPEG, dir.path()),
        &mut (),
    )
    .unwrap();

    let inner_start = 3 + outer_head.len() as u64;
    assert_eq!(
        summary.images,
        vec![
            FoundImage {
                id: 2,
                start: inner_start,
                end: inner_start + inner.len() as u64 - 1
            },
            FoundImage {
                id: 1,
                start: 0,
                end: data.len() as u64 - 1
            },
        ]
    );

    // The outer file receives the inner header bytes (echoed before the
    // inner match completes) but not the rest of the inner image.
    let outer_expected = [
        JPEG.header(),
        &outer_head[..],
        JPEG.header(),
        &outer_tail[..],
        JPEG.trailer(),
    ]
    .concat();
    assert_eq!(fs::read(dir.path().join("1.jpeg")).unwrap(), outer_expected);
    assert_eq!(fs::read(dir.path().join("2.jpeg")).unwrap(), inner);
}

#[test]
fn test_unterminated_file_left_on_disk() {
    let dir = TempDir::new().unwrap();
    let body = create_filler(1000, 10);
    let data = [&[0u8; 5][..], JPEG.header(), &body[..]].concat();

    let summary = scan(
        StreamSource::new(&data[..]),
        ScanConfig::extract(&JPEG, dir.path()),
        &mut (),
    )
    .unwrap();

    assert_eq!(summary.images_found, 0);
    assert_eq!(summary.unterminated, vec![PendingHeader { id: 1, start: 5 }]);
    assert_eq!(summary.partial_files.len(), 1);

    let written = fs::read(dir.path().join("1.jpeg")).unwrap();
    assert_eq!(written, [JPEG.header(), &body[..]].concat());
}

#[test]
fn test_orphan_trailer_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let data = [&create_filler(40, 11)[..], JPEG.trailer(), &create_filler(40, 12)[..]].concat();

    let summary = scan(
        StreamSource::new(&data[..]),
        ScanConfig::extract(&JPEG, dir.path()),
        &mut (),
    )
    .unwrap();

    assert_eq!(summary.images_found, 0);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_pending_limit_drops_extra_headers() {
    let mut data = Vec::new();
    for _ in 0..IMAGE_LIMIT + 1 {
        data.extend_from_slice(JPEG.header());
        data.push(0x00);
    }
    data.extend_from_slice(JPEG.trailer());

    let summary = analyze_jpeg(&data);

    assert_eq!(summary.headers_dropped, 1);
    assert_eq!(summary.images_found, 1);
    assert_eq!(summary.images[0].id, IMAGE_LIMIT as u64);
    assert_eq!(summary.unterminated.len(), IMAGE_LIMIT - 1);
}

#[test]
fn test_pending_limit_abort_policy() {
    let mut data = Vec::new();
    for _ in 0..IMAGE_LIMIT + 1 {
        data.extend_from_slice(JPEG.header());
        data.push(0x00);
    }

    let config = ScanConfig::analyze(&JPEG).with_overflow(OverflowPolicy::Abort);
    let result = scan(StreamSource::new(&data[..]), config, &mut ());

    assert!(matches!(
        result,
        Err(imgextr_core::CoreError::CapacityExceeded { limit: IMAGE_LIMIT, .. })
    ));
}

#[test]
fn test_analysis_is_idempotent() {
    let data = [
        &create_filler(513, 13)[..],
        &create_jpeg(3000, 14)[..],
        JPEG.trailer(),
        &create_jpeg(10, 15)[..],
        JPEG.header(),
    ]
    .concat();

    let first = analyze_jpeg(&data);
    let second = analyze_jpeg(&data);

    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn planted_images_are_found(
        gaps in proptest::collection::vec(0usize..1200, 1..6),
        bodies in proptest::collection::vec(0usize..1200, 1..6),
    ) {
        let count = gaps.len().min(bodies.len());
        let mut data = Vec::new();
        let mut expected = Vec::new();

        for (index, (gap, body)) in gaps.iter().zip(&bodies).take(count).enumerate() {
            data.extend_from_slice(&create_filler(*gap, index as u8));
            let start = data.len() as u64;
            data.extend_from_slice(&create_jpeg(*body, index as u8 + 100));
            expected.push(FoundImage {
                id: index as u64 + 1,
                start,
                end: data.len() as u64 - 1,
            });
        }

        let summary = analyze_jpeg(&data);
        prop_assert_eq!(summary.images, expected);
        prop_assert_eq!(summary.bytes_scanned, data.len() as u64);
    }
}
