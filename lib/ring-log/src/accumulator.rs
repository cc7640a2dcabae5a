use crate::entry::Entry;
use crate::error::{Error, Result};

const LF: u8 = b'\n';

/// The in-progress, not-yet-committed entry.
///
/// Commits happen one-per-`ingest`-call: if the chunk passed to [`AccumulationBuffer::ingest`]
/// causes the accumulated buffer to contain `0x0A` anywhere, the *entire* accumulated buffer
/// becomes a single new entry, even if it contains more than one newline. This matches the
/// reference char driver's `aesd_write`, which checks `strchr(buffptr, '\n')` once per write
/// syscall and commits the whole buffer as one `aesd_buffer_entry`.
///
/// Backed by a plain `Vec<u8>` rather than `bytes::BytesMut` so that growth can go through
/// `Vec::try_reserve` and surface an allocation failure as [`Error::ResourceExhausted`]
/// instead of aborting the process, matching `aesd_write`'s `krealloc` failure handling.
#[derive(Debug, Default)]
pub struct AccumulationBuffer {
    bytes: Vec<u8>,
}

impl AccumulationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Current (uncommitted) contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Appends `chunk`, committing and returning a new [`Entry`] if the accumulated buffer
    /// now contains a line terminator. The buffer is reset to empty on commit.
    ///
    /// If growing the buffer to fit `chunk` fails, returns `Err(Error::ResourceExhausted)`
    /// and leaves the buffer exactly as it was before the call.
    pub fn ingest(&mut self, chunk: &[u8]) -> Result<Option<Entry>> {
        self.bytes.try_reserve(chunk.len()).map_err(|err| {
            Error::ResourceExhausted(format!(
                "failed to grow accumulation buffer by {} bytes: {err}",
                chunk.len()
            ))
        })?;
        self.bytes.extend_from_slice(chunk);
        if self.bytes.contains(&LF) {
            let committed = std::mem::take(&mut self.bytes);
            Ok(Some(Entry::new(committed)))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_newline_leaves_log_unchanged_and_accumulates() {
        let mut acc = AccumulationBuffer::new();
        assert!(acc.ingest(b"hel").unwrap().is_none());
        assert!(acc.ingest(b"lo").unwrap().is_none());
        assert_eq!(acc.as_slice(), b"hello");
    }

    #[test]
    fn single_trailing_newline_commits_whole_chunk() {
        let mut acc = AccumulationBuffer::new();
        assert!(acc.ingest(b"hel").unwrap().is_none());
        let committed = acc.ingest(b"lo\n").unwrap().expect("should commit");
        assert_eq!(committed.bytes().as_ref(), b"hello\n");
        assert!(acc.is_empty());
    }

    #[test]
    fn multiple_newlines_in_one_chunk_still_commit_as_one_entry() {
        let mut acc = AccumulationBuffer::new();
        let committed = acc.ingest(b"a\nb\nc\n").unwrap().expect("should commit");
        assert_eq!(committed.bytes().as_ref(), b"a\nb\nc\n");
        assert!(acc.is_empty());
    }

    #[test]
    fn reset_after_commit_starts_fresh() {
        let mut acc = AccumulationBuffer::new();
        acc.ingest(b"first\n").unwrap();
        assert!(acc.ingest(b"second").unwrap().is_none());
        assert_eq!(acc.as_slice(), b"second");
    }
}
