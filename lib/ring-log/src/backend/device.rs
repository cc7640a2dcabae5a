use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

use super::LogBackend;
use crate::error::{Error, Result};

const READ_CHUNK: usize = 64 * 1024;

#[cfg(unix)]
const AESD_IOC_MAGIC: u8 = b'z';

#[cfg(unix)]
#[repr(C)]
struct AesdSeekTo {
    write_cmd: u32,
    write_cmd_offset: u32,
}

#[cfg(unix)]
nix::ioctl_readwrite!(aesd_ioc_seekto, AESD_IOC_MAGIC, 1, AesdSeekTo);

/// Defers all storage, eviction, and seeking to an external character device (the real
/// deployment target being the `aesdchar` kernel driver this crate is a userspace
/// reimplementation alongside). No in-process ring, accumulation buffer, shadow file, or
/// periodic timer: the device itself owns those semantics.
pub struct DeviceBackend {
    path: PathBuf,
    file: Option<std::fs::File>,
}

impl DeviceBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path, file: None }
    }

    fn take_file(&mut self) -> Result<std::fs::File> {
        self.file
            .take()
            .ok_or_else(|| Error::Fatal("device backend used before init()".into()))
    }
}

#[async_trait]
impl LogBackend for DeviceBackend {
    async fn init(&mut self) -> Result<()> {
        let path = self.path.clone();
        let file = tokio::task::spawn_blocking(move || {
            std::fs::OpenOptions::new().read(true).write(true).open(&path)
        })
        .await
        .map_err(|err| Error::Fatal(err.to_string()))??;
        self.file = Some(file);
        Ok(())
    }

    async fn ingest(&mut self, chunk: &[u8]) -> Result<()> {
        let mut file = self.take_file()?;
        let chunk = chunk.to_vec();
        let (file, result) = tokio::task::spawn_blocking(move || {
            use std::io::Write;
            let result = file.write_all(&chunk);
            (file, result)
        })
        .await
        .map_err(|err| Error::Fatal(err.to_string()))?;
        self.file = Some(file);
        result?;
        Ok(())
    }

    async fn read_stream(&mut self, cursor: u64) -> Result<(Bytes, u64, bool)> {
        let mut file = self.take_file()?;
        let (file, result) = tokio::task::spawn_blocking(move || {
            use std::io::{Read, Seek, SeekFrom};
            let outcome = (|| -> std::io::Result<Vec<u8>> {
                file.seek(SeekFrom::Start(cursor))?;
                let mut buf = vec![0u8; READ_CHUNK];
                let n = file.read(&mut buf)?;
                buf.truncate(n);
                Ok(buf)
            })();
            (file, outcome)
        })
        .await
        .map_err(|err| Error::Fatal(err.to_string()))?;
        self.file = Some(file);
        let buf = result?;
        let eof = buf.is_empty();
        let next_cursor = cursor + buf.len() as u64;
        Ok((Bytes::from(buf), next_cursor, eof))
    }

    #[cfg(unix)]
    async fn seek_to(&mut self, entry_index: u64, byte_offset: u64) -> Result<u64> {
        let write_cmd = u32::try_from(entry_index)
            .map_err(|_| Error::InvalidArgument(format!("entry index {entry_index} out of range")))?;
        let write_cmd_offset = u32::try_from(byte_offset)
            .map_err(|_| Error::InvalidArgument(format!("byte offset {byte_offset} out of range")))?;

        let mut file = self.take_file()?;
        let (file, result) = tokio::task::spawn_blocking(move || {
            use std::os::unix::io::AsRawFd;
            let mut arg = AesdSeekTo {
                write_cmd,
                write_cmd_offset,
            };
            let result = unsafe { aesd_ioc_seekto(file.as_raw_fd(), &mut arg) };
            (file, result)
        })
        .await
        .map_err(|err| Error::Fatal(err.to_string()))?;
        self.file = Some(file);

        let new_pos = result
            .map_err(|errno| Error::InvalidArgument(format!("seek ioctl failed: {errno}")))?;
        Ok(new_pos as u64)
    }

    #[cfg(not(unix))]
    async fn seek_to(&mut self, _entry_index: u64, _byte_offset: u64) -> Result<u64> {
        Err(Error::Fatal("device backend is only supported on unix".into()))
    }

    async fn periodic_timestamp(&mut self, _formatted: &[u8]) -> Result<()> {
        Err(Error::InvalidArgument(
            "periodic timestamp is not supported on the device backend".into(),
        ))
    }

    fn supports_periodic_timer(&self) -> bool {
        false
    }

    fn snapshot_len_and_bytes(&self) -> (usize, u64) {
        (0, 0)
    }

    async fn shutdown(&mut self) -> Result<()> {
        // The device is owned by the kernel/hardware, not by us; nothing to remove.
        self.file.take();
        Ok(())
    }
}
