//! Multiplexes scanned bytes into the output files of open carves.
//!
//! Every open carve owns one output file. Bytes always flow into the most
//! recently opened file that is still open, so a nested image absorbs the
//! bytes of its parent until its own trailer closes it.

use crate::error::{CoreError, Result};
use crate::stack::BoundedStack;
use crate::tracker::PendingHeader;
use crate::types::ImageTypeDescriptor;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const OUTPUT_BUFFER_SIZE: usize = 64 * 1024;

/// An output file written by the extraction writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedFile {
    pub id: u64,
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

struct OpenOutput {
    id: u64,
    path: PathBuf,
    writer: BufWriter<File>,
    hasher: Sha256,
    written: u64,
}

impl OpenOutput {
    fn create(id: u64, path: PathBuf) -> Result<Self> {
        let file = File::create(&path).map_err(|source| CoreError::OutputCreate {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            id,
            path,
            writer: BufWriter::with_capacity(OUTPUT_BUFFER_SIZE, file),
            hasher: Sha256::new(),
            written: 0,
        })
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .map_err(|source| CoreError::OutputWrite {
                path: self.path.clone(),
                source,
            })?;
        self.hasher.update(bytes);
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn finish(mut self) -> Result<ExtractedFile> {
        self.writer.flush().map_err(|source| CoreError::OutputWrite {
            path: self.path.clone(),
            source,
        })?;

        Ok(ExtractedFile {
            id: self.id,
            path: self.path,
            size: self.written,
            sha256: format!("{:x}", self.hasher.finalize()),
        })
    }
}

impl std::fmt::Debug for OpenOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenOutput")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("written", &self.written)
            .finish()
    }
}

#[derive(Debug)]
pub struct ExtractionWriter {
    output_dir: PathBuf,
    header: &'static [u8],
    extension: &'static str,
    open: BoundedStack<OpenOutput>,
}

impl ExtractionWriter {
    /// `output_dir` must already exist.
    pub fn new(output_dir: impl AsRef<Path>, descriptor: &ImageTypeDescriptor, limit: usize) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            header: descriptor.header(),
            extension: descriptor.extension(),
            open: BoundedStack::with_capacity(limit),
        }
    }

    /// Output path for image `id`: `<output_dir>/<id>.<extension>`.
    #[must_use]
    pub fn path_for(&self, id: u64) -> PathBuf {
        self.output_dir.join(format!("{}.{}", id, self.extension))
    }

    /// Appends `byte` to the innermost open file. No-op when nothing is open.
    #[inline]
    pub fn echo(&mut self, byte: u8) -> Result<()> {
        match self.open.top_mut() {
            Some(output) => output.write(&[byte]),
            None => Ok(()),
        }
    }

    /// Creates the file for an accepted header and seeds it with the header bytes.
    pub fn open(&mut self, header: &PendingHeader) -> Result<()> {
        let limit = self.open.capacity();
        let mut output = OpenOutput::create(header.id, self.path_for(header.id))?;
        output.write(self.header)?;

        debug!(id = header.id, path = %output.path.display(), "opened output file");

        self.open
            .try_push(output)
            .map_err(|_| CoreError::CapacityExceeded {
                offset: header.start,
                limit,
            })
    }

    /// Flushes and closes the innermost open file.
    pub fn close(&mut self) -> Result<Option<ExtractedFile>> {
        let Some(output) = self.open.pop() else {
            return Ok(None);
        };

        let file = output.finish()?;
        debug!(id = file.id, size = file.size, "closed output file");
        Ok(Some(file))
    }

    #[inline]
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Flushes and releases files whose trailer never arrived, oldest first.
    /// The files stay on disk.
    pub fn finish(mut self) -> Result<Vec<ExtractedFile>> {
        self.open.drain().map(OpenOutput::finish).collect()
    }
}
