//! Library half of the `ringlogd` binary: split out so integration tests can drive the
//! supervisor and connection workers directly over a real loopback socket instead of
//! shelling out to the compiled binary for every scenario.

pub mod cli;
pub mod connection;
pub mod server;
pub mod timer;
