use std::sync::Arc;
use std::time::Duration;

use ring_log::LogService;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Runs until `shutdown` fires, calling `service.periodic_timestamp()` once per `period`.
/// Modeled as its own cooperative task; no locking beyond the service's own guard is
/// needed, since `periodic_timestamp` interleaves with client ingests purely through
/// guard-acquisition order.
pub async fn run(service: Arc<LogService>, period: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    // The first tick fires immediately; skip it so the first timestamp lands after one
    // full period, matching the reference driver's `timer_settime` absolute first-fire.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(err) = service.periodic_timestamp().await {
                    warn!(error = %err, "periodic timestamp write failed");
                }
            }
        }
    }
}
