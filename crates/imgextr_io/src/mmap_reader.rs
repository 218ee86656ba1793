use imgextr_core::{BlockSource, CoreError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{Error, ErrorKind};
use std::path::Path;

/// A regular file mapped into memory, read front to back by the scanner.
///
/// Empty files and block devices map to nothing, so `new` refuses them and
/// [`crate::Reader::new`] falls back to [`crate::DiskReader`].
pub struct MmapReader {
    map: Mmap,
}

impl MmapReader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CoreError::InputOpen {
            path: path.to_path_buf(),
            source,
        })?;

        if file.metadata()?.len() == 0 {
            return Err(Error::new(ErrorKind::InvalidInput, "empty input cannot be mapped").into());
        }

        // The mapping is read-only and dropped with the reader.
        let map = unsafe { Mmap::map(&file) }?;
        if map.is_empty() {
            return Err(Error::new(ErrorKind::Unsupported, "input mapped to zero bytes").into());
        }

        #[cfg(target_os = "linux")]
        {
            let _ = map.advise(memmap2::Advice::Sequential);
        }

        Ok(Self { map })
    }

    /// Up to `len` mapped bytes starting at `offset`; empty past the end.
    #[inline]
    pub fn window(&self, offset: u64, len: usize) -> &[u8] {
        let start = usize::try_from(offset).map_or(self.map.len(), |o| o.min(self.map.len()));
        let end = start.saturating_add(len).min(self.map.len());
        &self.map[start..end]
    }
}

impl BlockSource for MmapReader {
    fn read_chunk(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        let window = self.window(offset, buffer.len());
        buffer[..window.len()].copy_from_slice(window);
        Ok(window.len())
    }

    fn size(&self) -> Option<u64> {
        Some(self.map.len() as u64)
    }
}
