use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load input file {}: {source}", path.display())]
    InputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to allocate a scan buffer of {size} bytes")]
    Allocation { size: usize },

    #[error("Failed to create output file {}: {source}", path.display())]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output file {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Header at offset {offset:#010X} exceeds the pending header limit of {limit}")]
    CapacityExceeded { offset: u64, limit: usize },

    #[error("Unknown image type: {0}")]
    UnknownImageType(String),

    #[error("Non-sequential read on a stream source: expected offset {expected}, got {requested}")]
    NonSequentialRead { expected: u64, requested: u64 },
}

pub type Result<T> = std::result::Result<T, CoreError>;
