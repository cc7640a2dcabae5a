use thiserror::Error;

/// Errors surfaced by the circular log, the accumulation buffer, and the log service.
#[derive(Error, Debug)]
pub enum Error {
    /// A seek target was out of range, pointed at an unoccupied slot, or a control command
    /// was malformed. Callers are expected to ignore this and leave their cursor unchanged.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Growing the accumulation buffer, or allocating a new entry, failed.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A transport or backing-store I/O failure.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// A condition that should never happen outside of guard corruption; unwinds to the
    /// supervisor, which logs and exits non-zero.
    #[error("fatal: {0}")]
    Fatal(String),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
