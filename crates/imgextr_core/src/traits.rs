//! Seams between the carving engine, its inputs and whoever watches a scan.

use crate::error::Result;
use crate::scan::ScanSummary;
use crate::tracker::{FoundImage, PendingHeader};

/// Raw input the scanner pulls blocks from.
///
/// The scanner always asks for the offset right after the last byte it got,
/// so forward-only streams can implement this as well as seekable files.
pub trait BlockSource {
    /// Fills `buffer` from `offset` and returns the byte count. Zero means
    /// end of input; a short count does not.
    fn read_chunk(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize>;

    /// Total length, when known before reading. Pipes return `None`.
    fn size(&self) -> Option<u64>;
}

impl<T: BlockSource + ?Sized> BlockSource for Box<T> {
    fn read_chunk(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        (**self).read_chunk(offset, buffer)
    }

    fn size(&self) -> Option<u64> {
        (**self).size()
    }
}

/// Receives progress and results while a scan runs.
///
/// Every method has an empty default body, so implementors only override
/// what they display. `()` is the silent observer.
pub trait ScanObserver {
    /// A block covering `start..end` (end exclusive) has been scanned.
    fn on_block(&mut self, _start: u64, _end: u64) {}

    /// A header was accepted as pending.
    fn on_header(&mut self, _header: &PendingHeader) {}

    /// A header starting at `start` was ignored because the pending limit
    /// was reached.
    fn on_header_dropped(&mut self, _start: u64) {}

    /// A trailer closed a pending header. `found` is the running count.
    fn on_image_found(&mut self, _image: &FoundImage, _found: u64) {}

    /// The scan reached the end of the input.
    fn on_finished(&mut self, _summary: &ScanSummary) {}
}

impl ScanObserver for () {}
