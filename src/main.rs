use anyhow::{Context, Result};
use clap::Parser;
use daemonize::Daemonize;
use ringlogd::cli::{Args, Settings};
use ringlogd::server;
use tracing_subscriber::EnvFilter;

/// Forking (via [`daemonize`]) must happen before the multi-threaded Tokio runtime is
/// built: a `fork()` after worker threads exist only carries the calling thread into the
/// child, leaving the runtime unusable. So this stays a plain `fn main`, and the runtime
/// is built by hand after the optional daemonization step — mirroring the reference
/// daemon's own `fork()`-then-bind ordering, where the listening socket is only ever
/// opened in the process that goes on to serve requests.
fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::from_args(args)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if settings.daemonize {
        Daemonize::new()
            .pid_file("/var/run/ringlogd.pid")
            .working_directory("/")
            .start()
            .context("failed to daemonize")?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build async runtime")?;

    runtime.block_on(server::run(settings))
}
