use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

const DEFAULT_BIND: &str = "0.0.0.0:9000";
const DEFAULT_CAPACITY: usize = 10;
const DEFAULT_SHADOW_FILE: &str = "/var/tmp/aesdsocketdata";
const DEFAULT_TIMER_PERIOD_SECS: u64 = 10;

/// A concurrent, line-oriented TCP server backed by a bounded circular log.
#[derive(Debug, Parser)]
#[command(name = "ringlogd", version, about)]
pub struct Args {
    /// Detach from the controlling terminal and run as a background daemon.
    #[arg(short = 'd', long = "daemonize", env = "AESD_DAEMONIZE")]
    pub daemonize: bool,

    /// Address and port to listen on.
    #[arg(long = "bind", env = "AESD_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Number of entries the in-process ring retains before evicting the oldest.
    /// Mutually exclusive with `--device`.
    #[arg(long = "capacity", env = "AESD_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Path to the plain-file mirror of the in-process ring. Pass an empty string to
    /// disable the shadow file entirely.
    #[arg(long = "shadow-file", env = "AESD_SHADOW_FILE", default_value = DEFAULT_SHADOW_FILE)]
    pub shadow_file: String,

    /// Defer storage and seeking to an external character device instead of the
    /// in-process ring. Disables eviction, the shadow file, and the periodic timer.
    #[arg(long = "device", env = "AESD_DEVICE", conflicts_with = "capacity")]
    pub device: Option<PathBuf>,

    /// Period of the periodic `timestamp:` writer, in seconds. Ignored when `--device`
    /// is set.
    #[arg(long = "timer-period", env = "AESD_TIMER_PERIOD", default_value_t = DEFAULT_TIMER_PERIOD_SECS)]
    pub timer_period_secs: u64,
}

/// Validated configuration derived from [`Args`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub daemonize: bool,
    pub bind: SocketAddr,
    pub backend: BackendChoice,
    pub timer_period: Duration,
}

#[derive(Debug, Clone)]
pub enum BackendChoice {
    Ring {
        capacity: usize,
        shadow_file: Option<PathBuf>,
    },
    Device(PathBuf),
}

impl Settings {
    pub fn from_args(args: Args) -> Result<Self> {
        if args.capacity == 0 {
            bail!("--capacity must be non-zero");
        }
        if args.timer_period_secs == 0 {
            bail!("--timer-period must be non-zero");
        }

        let backend = match args.device {
            Some(path) => BackendChoice::Device(path),
            None => {
                let shadow_file = if args.shadow_file.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(args.shadow_file))
                };
                BackendChoice::Ring {
                    capacity: args.capacity,
                    shadow_file,
                }
            }
        };

        Ok(Self {
            daemonize: args.daemonize,
            bind: args.bind,
            backend,
            timer_period: Duration::from_secs(args.timer_period_secs),
        })
    }
}
