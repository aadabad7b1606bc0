//! ORB topic introspection.
//!
//! Library half of the `orb_diagnostic` binary: configuration and the
//! command implementations, each writing its report to any `io::Write`.

pub mod commands;
pub mod config;

use orb::config::ConfigError;
use orb::format::FormatError;
use orb::registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagError {
    #[error("unknown topic '{0}'")]
    UnknownTopic(String),

    #[error("invalid hex payload: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid device id '{0}'")]
    InvalidDeviceId(String),

    #[error("monotonic clock unavailable: {0}")]
    Clock(#[from] nix::errno::Errno),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
