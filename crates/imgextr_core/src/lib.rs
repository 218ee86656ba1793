//! Streaming header/trailer image carving.
//!
//! The engine reads its input once, in fixed-size blocks, and pairs every
//! trailer signature with the most recent unpaired header signature. In
//! extraction mode the bytes of each pair are written to their own file as
//! they stream past.

mod error;
pub mod extraction;
pub mod matcher;
pub mod reader;
pub mod scan;
pub mod stack;
pub mod tracker;
mod traits;
mod types;

pub use error::{CoreError, Result};
pub use extraction::{ExtractedFile, ExtractionWriter};
pub use matcher::{SignatureMatcher, Step};
pub use reader::{Block, BlockReader, StreamSource, BLOCK_SIZE};
pub use scan::{scan, ScanConfig, ScanMode, ScanSummary, Scanner};
pub use tracker::{FoundImage, ImageTracker, OverflowPolicy, PendingHeader, IMAGE_LIMIT};
pub use traits::{BlockSource, ScanObserver};
pub use types::{ImageKind, ImageTypeDescriptor, JPEG, PNG};
