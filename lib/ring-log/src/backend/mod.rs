//! The storage strategy the [`crate::service::LogService`] delegates to.
//!
//! Two implementations exist: [`ring::RingBackend`], the in-process bounded circular log
//! with an optional shadow file, and [`device::DeviceBackend`], which defers storage,
//! eviction, and seeking entirely to an external character device. Both expose the same
//! `ingest` / `read_stream` / `seek_to` contract so [`crate::service::LogService`] does not
//! need to know which one it holds.

mod device;
mod ring;

pub use device::DeviceBackend;
pub use ring::RingBackend;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

#[async_trait]
pub trait LogBackend: Send {
    /// Prepares the backend for use (opens/truncates the shadow file, or opens the device
    /// path). Called once before the first ingest.
    async fn init(&mut self) -> Result<()>;

    /// Appends `chunk` to the accumulation buffer, committing a new entry if a line
    /// terminator is now present.
    async fn ingest(&mut self, chunk: &[u8]) -> Result<()>;

    /// Returns up to one entry's worth of bytes starting at absolute position `cursor`,
    /// the cursor's next value, and whether end-of-stream was reached.
    async fn read_stream(&mut self, cursor: u64) -> Result<(Bytes, u64, bool)>;

    /// Repositions to the entry at logical index `entry_index`, byte `byte_offset`,
    /// returning the resulting absolute position.
    async fn seek_to(&mut self, entry_index: u64, byte_offset: u64) -> Result<u64>;

    /// Appends a periodic timestamp line. Only meaningful when [`Self::supports_periodic_timer`].
    async fn periodic_timestamp(&mut self, formatted: &[u8]) -> Result<()>;

    /// Whether this backend supports the in-process periodic timestamp timer (and, by
    /// extension, eviction and the shadow file — these are ring-backend-only concerns).
    fn supports_periodic_timer(&self) -> bool;

    /// Diagnostic accessor for logging: resident entry count and total resident bytes.
    /// Not part of the original driver's surface, but useful for log lines on accept and
    /// eviction. The device backend has no notion of either, since it never holds entries
    /// in process; it reports `(0, 0)`.
    fn snapshot_len_and_bytes(&self) -> (usize, u64);

    /// Orderly shutdown: removes the shadow file for the ring backend; a no-op for the
    /// device backend (we never delete someone else's character device).
    async fn shutdown(&mut self) -> Result<()>;
}
