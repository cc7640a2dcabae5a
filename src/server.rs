use std::sync::Arc;

use anyhow::Result;
use ring_log::{DeviceBackend, LogBackend, LogService, RingBackend};
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{BackendChoice, Settings};
use crate::{connection, timer};

/// Binds the listen socket, accepts connections, spawns a worker per connection, and
/// drives orderly shutdown on `SIGINT`/`SIGTERM`.
///
/// Shutdown is cooperative: on the first signal, we stop accepting, cancel the periodic
/// timer, and wait for every in-flight connection worker to finish on its own (a worker
/// never gets torn down mid-`read`). Only once every worker has drained do we clean up
/// the backend (removing the shadow file for the ring backend) and return.
pub async fn run(settings: Settings) -> Result<()> {
    let timer_enabled = matches!(settings.backend, BackendChoice::Ring { .. });

    let backend: Box<dyn LogBackend> = match settings.backend {
        BackendChoice::Ring {
            capacity,
            shadow_file,
        } => Box::new(RingBackend::new(capacity, shadow_file)),
        BackendChoice::Device(path) => Box::new(DeviceBackend::new(path)),
    };
    let service = Arc::new(LogService::new(backend));
    service.init().await?;

    let listener = TcpListener::bind(settings.bind).await?;
    info!(addr = %settings.bind, "listening");

    let shutdown = CancellationToken::new();
    let mut workers = JoinSet::new();

    let timer_handle = timer_enabled.then(|| {
        let service = Arc::clone(&service);
        let period = settings.timer_period;
        let shutdown = shutdown.clone();
        tokio::spawn(timer::run(service, period, shutdown))
    });

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        info!(%peer, "accepted connection");
                        let service = Arc::clone(&service);
                        workers.spawn(connection::handle(stream, peer, service));
                    }
                    Err(err) => {
                        warn!(error = %err, "accept failed");
                    }
                }
            }
        }
    }

    shutdown.cancel();
    drop(listener);

    if let Some(handle) = timer_handle {
        let _ = handle.await;
    }
    while workers.join_next().await.is_some() {}

    service.shutdown().await?;
    info!("shutdown complete");
    Ok(())
}
