//! Logger setup for binaries and tests built on this crate.
//!
//! The library itself only emits through the `log` facade; installing a
//! backend is left to the embedding program.

mod init;

pub use init::{LoggingConfig, init_logging};
