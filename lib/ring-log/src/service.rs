use bytes::Bytes;
use chrono::Local;
use tokio::sync::Mutex;

use crate::backend::LogBackend;
use crate::error::Result;

/// Owns a [`LogBackend`] behind a single exclusive guard, serialising every ingest, read,
/// and seek across an unbounded number of connection workers plus the periodic timer.
///
/// A single `tokio::sync::Mutex` is used rather than a reader/writer split: echo paths are
/// as mutation-frequent as ingest paths, so a read/write split would buy nothing.
pub struct LogService {
    backend: Mutex<Box<dyn LogBackend>>,
}

impl LogService {
    pub fn new(backend: Box<dyn LogBackend>) -> Self {
        Self {
            backend: Mutex::new(backend),
        }
    }

    /// Prepares the backend (truncates the shadow file / opens the device). Call once
    /// before accepting connections.
    pub async fn init(&self) -> Result<()> {
        self.backend.lock().await.init().await
    }

    /// Appends `chunk`, committing a new entry if a line terminator is now present.
    pub async fn ingest_bytes(&self, chunk: &[u8]) -> Result<()> {
        self.backend.lock().await.ingest(chunk).await
    }

    /// Returns up to one entry's worth of bytes starting at `cursor`, the cursor's next
    /// value, and whether end-of-stream was reached. Calling this repeatedly from `0`
    /// yields the concatenation of all resident entries in logical order.
    pub async fn read_stream(&self, cursor: u64) -> Result<(Bytes, u64, bool)> {
        self.backend.lock().await.read_stream(cursor).await
    }

    /// Translates (logical entry index, byte offset) into an absolute position. Leaves
    /// the caller's cursor unchanged (the caller decides what to do with an `Err`).
    pub async fn seek_to(&self, entry_index: u64, byte_offset: u64) -> Result<u64> {
        self.backend.lock().await.seek_to(entry_index, byte_offset).await
    }

    /// Renders and ingests `timestamp:<RFC-822-ish local time>\n`. A no-op error (not
    /// fatal) when the backend does not support it (the device backend).
    pub async fn periodic_timestamp(&self) -> Result<()> {
        let mut backend = self.backend.lock().await;
        if !backend.supports_periodic_timer() {
            return Ok(());
        }
        let formatted = format!("timestamp:{}\n", Local::now().format("%a, %d %b %Y %T %z"));
        backend.periodic_timestamp(formatted.as_bytes()).await
    }

    /// Orderly shutdown: removes the shadow file for the ring backend, no-op otherwise.
    pub async fn shutdown(&self) -> Result<()> {
        self.backend.lock().await.shutdown().await
    }

    /// Diagnostic accessor for logging: resident entry count and total resident bytes.
    pub async fn snapshot_len_and_bytes(&self) -> (usize, u64) {
        self.backend.lock().await.snapshot_len_and_bytes()
    }
}
