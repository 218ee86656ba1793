//! Input adapters for the carving engine.

mod mmap_reader;
mod reader;

pub use mmap_reader::MmapReader;
pub use reader::DiskReader;

use imgextr_core::{BlockSource, Result, StreamSource};
use std::io::Stdin;
use std::path::Path;

/// Path that selects standard input instead of a file.
pub const STDIN_PATH: &str = "-";

pub enum Reader {
    Mmap(MmapReader),
    Disk(DiskReader),
    Stdin(StreamSource<Stdin>),
}

impl Reader {
    /// Memory-maps regular files and falls back to plain reads for devices
    /// and empty files.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        match MmapReader::new(path_ref) {
            Ok(r) => Ok(Reader::Mmap(r)),
            Err(_) => Ok(Reader::Disk(DiskReader::new(path_ref)?)),
        }
    }

    pub fn stdin() -> Self {
        Reader::Stdin(StreamSource::new(std::io::stdin()))
    }

    #[inline]
    pub fn is_mmap(&self) -> bool {
        matches!(self, Reader::Mmap(_))
    }

    #[inline]
    pub fn kind(&self) -> &'static str {
        match self {
            Reader::Mmap(_) => "mmap",
            Reader::Disk(_) => "disk",
            Reader::Stdin(_) => "stdin",
        }
    }
}

impl BlockSource for Reader {
    fn read_chunk(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        match self {
            Reader::Mmap(r) => r.read_chunk(offset, buffer),
            Reader::Disk(r) => r.read_chunk(offset, buffer),
            Reader::Stdin(r) => r.read_chunk(offset, buffer),
        }
    }

    fn size(&self) -> Option<u64> {
        match self {
            Reader::Mmap(r) => r.size(),
            Reader::Disk(r) => r.size(),
            Reader::Stdin(r) => r.size(),
        }
    }
}

/// Opens the scan input: `-` for standard input, otherwise a file or device.
pub fn open_input(path: impl AsRef<Path>) -> Result<Reader> {
    let path = path.as_ref();
    if path == Path::new(STDIN_PATH) {
        Ok(Reader::stdin())
    } else {
        Reader::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgextr_core::CoreError;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_regular_file_is_mapped() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"\xFF\xD8\xFF\x00\xFF\xD9").unwrap();
        temp_file.flush().unwrap();

        let reader = open_input(temp_file.path()).unwrap();
        assert!(reader.is_mmap());
        assert_eq!(reader.size(), Some(6));
    }

    #[test]
    fn test_empty_file_falls_back_to_disk() {
        let temp_file = NamedTempFile::new().unwrap();

        let mut reader = open_input(temp_file.path()).unwrap();
        assert_eq!(reader.kind(), "disk");

        let mut buffer = [0u8; 16];
        assert_eq!(reader.read_chunk(0, &mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_missing_file_is_input_open_error() {
        let dir = TempDir::new().unwrap();
        let result = open_input(dir.path().join("missing.raw"));

        assert!(matches!(result, Err(CoreError::InputOpen { .. })));
    }

    #[test]
    fn test_dash_selects_stdin() {
        let reader = open_input(STDIN_PATH).unwrap();
        assert_eq!(reader.kind(), "stdin");
        assert_eq!(reader.size(), None);
    }
}
