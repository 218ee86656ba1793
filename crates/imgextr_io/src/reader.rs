//! Positional reads for inputs that cannot be memory-mapped.

use imgextr_core::{BlockSource, CoreError, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Reads an image file or block device (`/dev/sdb`, `/dev/mmcblk0`, ...)
/// through ordinary `read` calls.
///
/// The scanner only asks for the next offset, so the reader tracks its
/// cursor and seeks only when a caller jumps.
///
/// ```ignore
/// let mut reader = DiskReader::new("/dev/sdb")?;
/// let mut block = [0u8; imgextr_core::BLOCK_SIZE];
/// let n = reader.read_chunk(0, &mut block)?;
/// ```
pub struct DiskReader {
    file: File,
    len: u64,
    cursor: u64,
}

impl DiskReader {
    /// # Errors
    ///
    /// `InputOpen` when the path cannot be opened for reading or its length
    /// cannot be determined.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input_open = |source| CoreError::InputOpen {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(input_open)?;

        // Devices report a zero metadata length, seeking to the end does not.
        let len = file.seek(SeekFrom::End(0)).map_err(input_open)?;
        file.rewind().map_err(input_open)?;

        #[cfg(target_os = "linux")]
        {
            use rustix::fs::{fadvise, Advice};
            let _ = fadvise(&file, 0, None, Advice::Sequential);
        }

        Ok(Self {
            file,
            len,
            cursor: 0,
        })
    }
}

impl BlockSource for DiskReader {
    fn read_chunk(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        if offset != self.cursor {
            self.cursor = self.file.seek(SeekFrom::Start(offset))?;
        }

        let n = self.file.read(buffer)?;
        self.cursor += n as u64;
        Ok(n)
    }

    fn size(&self) -> Option<u64> {
        Some(self.len)
    }
}
