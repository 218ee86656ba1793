use crate::error::{CoreError, Result};
use crate::stack::BoundedStack;
use serde::Serialize;

/// Maximum number of headers awaiting a trailer at any time.
pub const IMAGE_LIMIT: usize = 100;

/// What to do with a header that arrives while the pending stack is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Ignore the header: no id is consumed and no output is opened.
    #[default]
    DropNewest,
    /// Stop the scan with [`CoreError::CapacityExceeded`].
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingHeader {
    pub id: u64,
    pub start: u64,
}

/// An image bounded by a header and the trailer that closed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FoundImage {
    pub id: u64,
    pub start: u64,
    pub end: u64,
}

impl FoundImage {
    /// Inclusive span length in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.end - self.start + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderOutcome {
    Accepted(PendingHeader),
    Dropped { start: u64 },
}

/// Pairs headers with trailers, most recent header first.
#[derive(Debug)]
pub struct ImageTracker {
    pending: BoundedStack<PendingHeader>,
    header_len: u64,
    policy: OverflowPolicy,
    next_id: u64,
    found: u64,
    dropped: u64,
}

impl ImageTracker {
    pub fn new(header_len: usize, limit: usize, policy: OverflowPolicy) -> Self {
        Self {
            pending: BoundedStack::with_capacity(limit),
            header_len: header_len as u64,
            policy,
            next_id: 1,
            found: 0,
            dropped: 0,
        }
    }

    /// Records a header whose last byte sits at `end_offset`.
    pub fn on_header_match(&mut self, end_offset: u64) -> Result<HeaderOutcome> {
        let start = end_offset + 1 - self.header_len;
        let header = PendingHeader {
            id: self.next_id,
            start,
        };

        match self.pending.try_push(header) {
            Ok(()) => {
                self.next_id += 1;
                Ok(HeaderOutcome::Accepted(header))
            }
            Err(_) => match self.policy {
                OverflowPolicy::DropNewest => {
                    self.dropped += 1;
                    Ok(HeaderOutcome::Dropped { start })
                }
                OverflowPolicy::Abort => Err(CoreError::CapacityExceeded {
                    offset: start,
                    limit: self.pending.capacity(),
                }),
            },
        }
    }

    /// Closes the most recent pending header, if any.
    pub fn on_trailer_match(&mut self, end_offset: u64) -> Option<FoundImage> {
        let header = self.pending.pop()?;
        self.found += 1;

        Some(FoundImage {
            id: header.id,
            start: header.start,
            end: end_offset,
        })
    }

    #[inline]
    pub fn found(&self) -> u64 {
        self.found
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Headers still waiting for a trailer, oldest first.
    pub fn take_pending(&mut self) -> Vec<PendingHeader> {
        self.pending.drain().collect()
    }
}
