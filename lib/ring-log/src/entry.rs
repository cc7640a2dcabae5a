use bytes::Bytes;

/// A single committed entry in the circular log.
///
/// An entry always ends in `0x0A`; the terminating newline is part of `bytes` and counts
/// towards `len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    bytes: Bytes,
}

impl Entry {
    /// Builds an entry from an owned buffer. Does not validate that `bytes` ends in a
    /// newline — callers (the accumulation buffer) are responsible for only committing
    /// complete lines.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self { bytes: bytes.into() }
    }

    /// The entry's byte length. Always `>= 1` for a committed entry.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The entry's contents, in full.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// The suffix of this entry starting at `offset`. `offset` must be `<= self.len()`.
    pub fn slice_from(&self, offset: usize) -> Bytes {
        self.bytes.slice(offset.min(self.bytes.len())..)
    }
}
