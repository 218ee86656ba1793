use crate::error::{CoreError, Result};
use crate::traits::BlockSource;
use std::io::{ErrorKind, Read};

/// Bytes pulled from the source per block.
pub const BLOCK_SIZE: usize = 512;

/// One block of input and the absolute offset of its first byte.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    pub offset: u64,
    pub data: &'a [u8],
}

impl Block<'_> {
    /// Offset one past the last byte of the block.
    #[inline]
    #[must_use]
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }
}

/// Pulls fixed-size blocks from a [`BlockSource`], strictly forward.
pub struct BlockReader<S> {
    source: S,
    buffer: Vec<u8>,
    position: u64,
    blocks: u64,
}

impl<S: BlockSource> BlockReader<S> {
    pub fn new(source: S, block_size: usize) -> Result<Self> {
        assert!(block_size > 0, "Block size must be greater than 0");

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(block_size)
            .map_err(|_| CoreError::Allocation { size: block_size })?;
        buffer.resize(block_size, 0);

        Ok(Self {
            source,
            buffer,
            position: 0,
            blocks: 0,
        })
    }

    /// Reads the next block, or `None` once the source yields zero bytes.
    pub fn next_block(&mut self) -> Result<Option<Block<'_>>> {
        let bytes_read = loop {
            match self.source.read_chunk(self.position, &mut self.buffer) {
                Ok(n) => break n,
                Err(CoreError::Io(e)) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };

        if bytes_read == 0 {
            return Ok(None);
        }

        let offset = self.position;
        self.position += bytes_read as u64;
        self.blocks += 1;

        Ok(Some(Block {
            offset,
            data: &self.buffer[..bytes_read],
        }))
    }

    /// Total bytes consumed so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    #[inline]
    pub fn blocks_read(&self) -> u64 {
        self.blocks
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.source.size()
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

/// Adapts any [`Read`] into a forward-only [`BlockSource`].
pub struct StreamSource<R> {
    inner: R,
    position: u64,
}

impl<R: Read> StreamSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }
}

impl<R: Read> BlockSource for StreamSource<R> {
    fn read_chunk(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        if offset != self.position {
            return Err(CoreError::NonSequentialRead {
                expected: self.position,
                requested: offset,
            });
        }

        let bytes_read = self.inner.read(buffer)?;
        self.position += bytes_read as u64;

        Ok(bytes_read)
    }

    fn size(&self) -> Option<u64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct Trickle<'a> {
        data: &'a [u8],
        interrupted: bool,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            let n = self.data.len().min(buf.len()).min(3);
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_blocks_and_offsets() {
        let data: Vec<u8> = (0..1200u32).map(|i| i as u8).collect();
        let mut reader = BlockReader::new(StreamSource::new(&data[..]), BLOCK_SIZE).unwrap();

        let block = reader.next_block().unwrap().unwrap();
        assert_eq!((block.offset, block.end()), (0, 512));
        assert_eq!(block.data, &data[..512]);

        let block = reader.next_block().unwrap().unwrap();
        assert_eq!((block.offset, block.end()), (512, 1024));

        let block = reader.next_block().unwrap().unwrap();
        assert_eq!((block.offset, block.end()), (1024, 1200));
        assert_eq!(block.data.len(), 176);

        assert!(reader.next_block().unwrap().is_none());
        assert_eq!(reader.position(), 1200);
        assert_eq!(reader.blocks_read(), 3);
    }

    #[test]
    fn test_empty_source() {
        let mut reader = BlockReader::new(StreamSource::new(io::empty()), BLOCK_SIZE).unwrap();
        assert!(reader.next_block().unwrap().is_none());
        assert_eq!(reader.blocks_read(), 0);
    }

    #[test]
    fn test_short_reads_and_interrupts() {
        let data = [1u8, 2, 3, 4, 5, 6, 7];
        let source = StreamSource::new(Trickle {
            data: &data,
            interrupted: false,
        });
        let mut reader = BlockReader::new(source, BLOCK_SIZE).unwrap();

        let mut collected = Vec::new();
        while let Some(block) = reader.next_block().unwrap() {
            assert_eq!(block.offset, collected.len() as u64);
            collected.extend_from_slice(block.data);
        }

        assert_eq!(collected, data);
        assert_eq!(reader.blocks_read(), 3);
    }

    #[test]
    fn test_stream_source_rejects_seek() {
        let mut source = StreamSource::new(&b"abcdef"[..]);
        let mut buffer = [0u8; 4];

        assert_eq!(source.read_chunk(0, &mut buffer).unwrap(), 4);
        let err = source.read_chunk(0, &mut buffer).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NonSequentialRead {
                expected: 4,
                requested: 0
            }
        ));
        assert_eq!(source.size(), None);
    }

    #[test]
    fn test_unallocatable_block_size() {
        let result = BlockReader::new(StreamSource::new(io::empty()), usize::MAX);
        assert!(matches!(result, Err(CoreError::Allocation { size: usize::MAX })));
    }

    #[test]
    #[should_panic(expected = "Block size must be greater than 0")]
    fn test_zero_block_size_panics() {
        let _ = BlockReader::new(StreamSource::new(io::empty()), 0);
    }
}
