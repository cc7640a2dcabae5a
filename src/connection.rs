use std::net::SocketAddr;
use std::sync::Arc;

use ring_log::LogService;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn, Instrument};

/// Bytes read per `recv`. Matches the reference daemon's 1024-byte scratch buffer.
const CHUNK: usize = 1024;

/// Drives one accepted connection for its entire lifetime: appends non-control bytes to
/// the shared log, echoes the log back from the connection's read cursor on every
/// newline, and handles the out-of-band seek command. Runs until the peer disconnects or
/// an unrecoverable I/O error occurs — there is no forced shutdown of an in-flight
/// connection; the supervisor only waits for workers like this one to finish naturally.
pub async fn handle(stream: TcpStream, peer: SocketAddr, service: Arc<LogService>) {
    let span = tracing::info_span!("connection", %peer);
    run(stream, service).instrument(span).await
}

async fn run(mut stream: TcpStream, service: Arc<LogService>) {
    let mut read_cursor: u64 = 0;
    let mut buf = vec![0u8; CHUNK];

    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => {
                debug!("peer closed connection");
                break;
            }
            Ok(n) => n,
            Err(err) => {
                warn!(error = %err, "read error, terminating connection");
                break;
            }
        };
        let chunk = &buf[..n];

        if let Some(cmd) = ring_log::decode_control_command(chunk) {
            match service.seek_to(cmd.write_cmd, cmd.write_cmd_offset).await {
                Ok(pos) => {
                    debug!(entry = cmd.write_cmd, offset = cmd.write_cmd_offset, pos, "seek");
                    read_cursor = pos;
                }
                Err(err) => {
                    debug!(error = %err, "ignoring invalid seek command");
                }
            }
            continue;
        }

        if let Err(err) = service.ingest_bytes(chunk).await {
            warn!(error = %err, "ingest failed, dropping chunk");
            continue;
        }
        let (entries, total_bytes) = service.snapshot_len_and_bytes().await;
        debug!(entries, total_bytes, "ingested chunk");

        if chunk.contains(&b'\n') && echo(&mut stream, &service, &mut read_cursor).await.is_err() {
            break;
        }
    }
}

/// Sends the log's contents from `*cursor` through end, advancing `*cursor` as it goes,
/// then resets `*cursor` to `0` for the next echo. Returns `Err(())` on any I/O failure
/// (broken pipe, backend failure); the caller terminates the connection in that case.
async fn echo(stream: &mut TcpStream, service: &LogService, cursor: &mut u64) -> Result<(), ()> {
    loop {
        let (chunk, next, eof) = match service.read_stream(*cursor).await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "read_stream failed during echo");
                return Err(());
            }
        };
        if eof {
            break;
        }
        if let Err(err) = stream.write_all(&chunk).await {
            debug!(error = %err, "broken pipe during echo");
            return Err(());
        }
        *cursor = next;
    }
    *cursor = 0;
    Ok(())
}
