//! Single-pass scan orchestration.
//!
//! A [`Scanner`] is built once per input (allocating the block buffer and,
//! in extraction mode, the writer), runs every byte of every block through
//! the extraction echo, the header matcher and the trailer matcher in that
//! order, and ends by producing an immutable [`ScanSummary`].

use crate::error::Result;
use crate::extraction::{ExtractedFile, ExtractionWriter};
use crate::matcher::{SignatureMatcher, Step};
use crate::reader::{BlockReader, BLOCK_SIZE};
use crate::tracker::{FoundImage, HeaderOutcome, ImageTracker, OverflowPolicy, PendingHeader, IMAGE_LIMIT};
use crate::traits::{BlockSource, ScanObserver};
use crate::types::{ImageKind, ImageTypeDescriptor};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanMode {
    Analyze,
    /// Write each found image to `<output_dir>/<id>.<extension>`. The
    /// directory must exist before the scan starts.
    Extract { output_dir: PathBuf },
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub descriptor: &'static ImageTypeDescriptor,
    pub mode: ScanMode,
    pub block_size: usize,
    pub pending_limit: usize,
    pub overflow: OverflowPolicy,
}

impl ScanConfig {
    pub fn analyze(descriptor: &'static ImageTypeDescriptor) -> Self {
        Self {
            descriptor,
            mode: ScanMode::Analyze,
            block_size: BLOCK_SIZE,
            pending_limit: IMAGE_LIMIT,
            overflow: OverflowPolicy::default(),
        }
    }

    pub fn extract(descriptor: &'static ImageTypeDescriptor, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: ScanMode::Extract {
                output_dir: output_dir.into(),
            },
            ..Self::analyze(descriptor)
        }
    }

    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    #[must_use]
    pub fn with_pending_limit(mut self, limit: usize) -> Self {
        self.pending_limit = limit;
        self
    }

    #[must_use]
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    #[inline]
    pub fn is_extracting(&self) -> bool {
        matches!(self.mode, ScanMode::Extract { .. })
    }
}

/// Result of one completed scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub image_type: ImageKind,
    pub extraction: bool,
    pub bytes_scanned: u64,
    pub blocks: u64,
    pub images_found: u64,
    pub headers_dropped: u64,
    pub images: Vec<FoundImage>,
    /// Headers that never saw a trailer, oldest first.
    pub unterminated: Vec<PendingHeader>,
    pub extracted: Vec<ExtractedFile>,
    /// Output files of unterminated headers, left on disk as written.
    pub partial_files: Vec<ExtractedFile>,
}

struct CarveState {
    header: SignatureMatcher,
    trailer: SignatureMatcher,
    tracker: ImageTracker,
    writer: Option<ExtractionWriter>,
    images: Vec<FoundImage>,
    extracted: Vec<ExtractedFile>,
}

impl CarveState {
    fn new(config: &ScanConfig) -> Self {
        let descriptor = config.descriptor;
        let writer = match &config.mode {
            ScanMode::Analyze => None,
            ScanMode::Extract { output_dir } => Some(ExtractionWriter::new(
                output_dir,
                descriptor,
                config.pending_limit,
            )),
        };

        Self {
            header: SignatureMatcher::header(descriptor),
            trailer: SignatureMatcher::trailer(descriptor),
            tracker: ImageTracker::new(
                descriptor.header().len(),
                config.pending_limit,
                config.overflow,
            ),
            writer,
            images: Vec::new(),
            extracted: Vec::new(),
        }
    }

    #[inline]
    fn feed<O: ScanObserver + ?Sized>(
        &mut self,
        position: u64,
        byte: u8,
        observer: &mut O,
    ) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.echo(byte)?;
        }

        if self.header.feed(byte) == Step::Complete {
            match self.tracker.on_header_match(position)? {
                HeaderOutcome::Accepted(header) => {
                    if let Some(writer) = self.writer.as_mut() {
                        writer.open(&header)?;
                    }
                    trace!(id = header.id, start = header.start, "header pending");
                    observer.on_header(&header);
                }
                HeaderOutcome::Dropped { start } => {
                    warn!(
                        start = format_args!("{:#010X}", start),
                        pending = self.tracker.pending(),
                        "pending header limit reached, header ignored"
                    );
                    observer.on_header_dropped(start);
                }
            }
        }

        if self.trailer.feed(byte) == Step::Complete {
            if let Some(image) = self.tracker.on_trailer_match(position) {
                if let Some(writer) = self.writer.as_mut() {
                    if let Some(file) = writer.close()? {
                        self.extracted.push(file);
                    }
                }
                debug!(
                    id = image.id,
                    sof = format_args!("{:#010X}", image.start),
                    eof = format_args!("{:#010X}", image.end),
                    "image found"
                );
                observer.on_image_found(&image, self.tracker.found());
                self.images.push(image);
            }
        }

        Ok(())
    }
}

pub struct Scanner<S> {
    config: ScanConfig,
    reader: BlockReader<S>,
    state: CarveState,
}

impl<S: BlockSource> Scanner<S> {
    /// Allocates the block buffer and per-scan state. Fails with
    /// `Allocation` before anything is read.
    pub fn new(source: S, config: ScanConfig) -> Result<Self> {
        let reader = BlockReader::new(source, config.block_size)?;
        let state = CarveState::new(&config);

        Ok(Self {
            config,
            reader,
            state,
        })
    }

    #[inline]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scans the source to exhaustion. Output files are flushed and the
    /// source is dropped on every path out of this function.
    pub fn run<O: ScanObserver + ?Sized>(mut self, observer: &mut O) -> Result<ScanSummary> {
        info!(
            image_type = %self.config.descriptor.kind(),
            extraction = self.config.is_extracting(),
            size = ?self.reader.size(),
            "scan started"
        );

        while let Some(block) = self.reader.next_block()? {
            trace!(start = block.offset, end = block.end(), "scanning block");
            observer.on_block(block.offset, block.end());

            for (position, &byte) in (block.offset..).zip(block.data) {
                self.state.feed(position, byte, observer)?;
            }
        }

        let unterminated = self.state.tracker.take_pending();
        let partial_files = match self.state.writer.take() {
            Some(writer) => writer.finish()?,
            None => Vec::new(),
        };

        if !unterminated.is_empty() {
            warn!(
                count = unterminated.len(),
                "input ended with headers that have no trailer"
            );
        }

        let summary = ScanSummary {
            image_type: self.config.descriptor.kind(),
            extraction: self.config.is_extracting(),
            bytes_scanned: self.reader.position(),
            blocks: self.reader.blocks_read(),
            images_found: self.state.tracker.found(),
            headers_dropped: self.state.tracker.dropped(),
            images: self.state.images,
            unterminated,
            extracted: self.state.extracted,
            partial_files,
        };

        info!(
            images_found = summary.images_found,
            bytes_scanned = summary.bytes_scanned,
            "scan complete"
        );
        observer.on_finished(&summary);

        Ok(summary)
    }
}

/// Builds a [`Scanner`] over `source` and runs it to completion.
pub fn scan<S, O>(source: S, config: ScanConfig, observer: &mut O) -> Result<ScanSummary>
where
    S: BlockSource,
    O: ScanObserver + ?Sized,
{
    Scanner::new(source, config)?.run(observer)
}
