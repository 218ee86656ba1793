//! Byte-at-a-time exact signature matcher.
//!
//! The matcher only tracks the length of the current run of matching bytes.
//! On a mismatch the run drops to zero and the offending byte is not
//! reconsidered, so an occurrence that begins on that byte is missed
//! (`FF FF D8 FF` does not contain a JPEG header as far as the matcher is
//! concerned). This under-matching is accepted.

use crate::types::ImageTypeDescriptor;

/// Outcome of feeding one byte to a [`SignatureMatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The byte completed the signature. The run has been reset.
    Complete,
    /// The byte extended (or started) a run that is still short of the signature.
    Partial,
    /// The byte is not part of any run.
    Miss,
}

#[derive(Debug, Clone)]
pub struct SignatureMatcher {
    signature: &'static [u8],
    run: usize,
}

impl SignatureMatcher {
    #[must_use]
    pub fn new(signature: &'static [u8]) -> Self {
        assert!(!signature.is_empty(), "signature must not be empty");
        Self { signature, run: 0 }
    }

    #[must_use]
    pub fn header(descriptor: &ImageTypeDescriptor) -> Self {
        Self::new(descriptor.header())
    }

    #[must_use]
    pub fn trailer(descriptor: &ImageTypeDescriptor) -> Self {
        Self::new(descriptor.trailer())
    }

    #[inline]
    pub fn feed(&mut self, byte: u8) -> Step {
        if byte == self.signature[self.run] {
            self.run += 1;
        } else {
            self.run = 0;
        }

        if self.run == self.signature.len() {
            self.run = 0;
            Step::Complete
        } else if self.run > 0 {
            Step::Partial
        } else {
            Step::Miss
        }
    }

    /// Feeds every byte of `data`, calling `callback` with the index of the
    /// last byte of each completed signature. State carries over between calls.
    #[inline]
    pub fn feed_callback<F>(&mut self, data: &[u8], mut callback: F)
    where
        F: FnMut(usize),
    {
        for (index, &byte) in data.iter().enumerate() {
            if self.feed(byte) == Step::Complete {
                callback(index);
            }
        }
    }

    #[must_use]
    pub fn match_ends(&mut self, data: &[u8]) -> Vec<usize> {
        let mut ends = Vec::new();
        self.feed_callback(data, |end| ends.push(end));
        ends
    }

    #[inline]
    #[must_use]
    pub fn run_length(&self) -> usize {
        self.run
    }

    #[inline]
    #[must_use]
    pub fn signature(&self) -> &'static [u8] {
        self.signature
    }

    pub fn reset(&mut self) {
        self.run = 0;
    }
}
