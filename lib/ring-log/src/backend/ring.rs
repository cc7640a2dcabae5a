use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::LogBackend;
use crate::accumulator::AccumulationBuffer;
use crate::circular::CircularLog;
use crate::error::Result;

/// The in-process bounded circular log, with an optional plain-file mirror ("shadow
/// file") of everything committed, matching `aesdsocket.c`'s `/var/tmp/aesdsocketdata`.
pub struct RingBackend {
    log: CircularLog,
    accumulator: AccumulationBuffer,
    shadow_path: Option<PathBuf>,
    shadow_file: Option<File>,
}

impl RingBackend {
    pub fn new(capacity: usize, shadow_path: Option<PathBuf>) -> Self {
        Self {
            log: CircularLog::new(capacity),
            accumulator: AccumulationBuffer::new(),
            shadow_path,
            shadow_file: None,
        }
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.log.total_bytes()
    }
}

#[async_trait]
impl LogBackend for RingBackend {
    async fn init(&mut self) -> Result<()> {
        if let Some(path) = &self.shadow_path {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .await?;
            debug!(path = %path.display(), "truncated shadow file");
            self.shadow_file = Some(file);
        }
        Ok(())
    }

    async fn ingest(&mut self, chunk: &[u8]) -> Result<()> {
        let Some(entry) = self.accumulator.ingest(chunk)? else {
            return Ok(());
        };

        if let Some(file) = &mut self.shadow_file {
            file.write_all(entry.bytes()).await?;
            file.flush().await?;
        }

        if let Some(evicted) = self.log.append(entry) {
            debug!(bytes = evicted.len(), "evicted oldest entry");
        }
        Ok(())
    }

    async fn read_stream(&mut self, cursor: u64) -> Result<(Bytes, u64, bool)> {
        match self.log.locate_by_absolute(cursor) {
            Some((entry, offset)) => {
                let remainder = entry.slice_from(offset as usize);
                let next_cursor = cursor + remainder.len() as u64;
                Ok((remainder, next_cursor, false))
            }
            None => Ok((Bytes::new(), cursor, true)),
        }
    }

    async fn seek_to(&mut self, entry_index: u64, byte_offset: u64) -> Result<u64> {
        self.log.locate_by_index(entry_index, byte_offset)
    }

    async fn periodic_timestamp(&mut self, formatted: &[u8]) -> Result<()> {
        self.ingest(formatted).await
    }

    fn supports_periodic_timer(&self) -> bool {
        true
    }

    fn snapshot_len_and_bytes(&self) -> (usize, u64) {
        (self.log.len(), self.log.total_bytes())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.shadow_file.take();
        if let Some(path) = &self.shadow_path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to remove shadow file");
                    return Err(err.into());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ingest_mirrors_committed_entries_to_shadow_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shadow.log");
        let mut backend = RingBackend::new(4, Some(path.clone()));
        backend.init().await.unwrap();

        backend.ingest(b"hello\n").await.unwrap();
        backend.ingest(b"wor").await.unwrap();
        backend.ingest(b"ld\n").await.unwrap();

        let contents = tokio::fs::read(&path).await.unwrap();
        assert_eq!(contents, b"hello\nworld\n");
        assert_eq!(backend.len(), 2);
    }

    #[tokio::test]
    async fn shutdown_removes_shadow_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shadow.log");
        let mut backend = RingBackend::new(4, Some(path.clone()));
        backend.init().await.unwrap();
        backend.ingest(b"a\n").await.unwrap();
        assert!(path.exists());

        backend.shutdown().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn read_stream_walks_to_eof() {
        let mut backend = RingBackend::new(4, None);
        backend.init().await.unwrap();
        backend.ingest(b"aa\n").await.unwrap();
        backend.ingest(b"bbbb\n").await.unwrap();

        let (chunk1, cursor1, eof1) = backend.read_stream(0).await.unwrap();
        assert_eq!(chunk1.as_ref(), b"aa\n");
        assert!(!eof1);
        let (chunk2, cursor2, eof2) = backend.read_stream(cursor1).await.unwrap();
        assert_eq!(chunk2.as_ref(), b"bbbb\n");
        assert!(!eof2);
        let (chunk3, _, eof3) = backend.read_stream(cursor2).await.unwrap();
        assert!(chunk3.is_empty());
        assert!(eof3);
    }
}
