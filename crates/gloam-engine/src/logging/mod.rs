//! Logging utilities.
//!
//! The engine only talks to the `log` facade. This module wires `env_logger` as the
//! backend for binaries; tests and embedders may install any other logger instead.

#[cfg(test)]
pub(crate) mod capture;
mod init;

pub use init::{init_logging, LoggingConfig};
