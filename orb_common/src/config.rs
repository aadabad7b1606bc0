//! TOML configuration for ORB tools.
//!
//! A tool's config struct is a set of optional sections: `[shared]`
//! ([`SharedConfig`]), `[registry]` ([`RegistryConfig`]) and `[output]`
//! ([`OutputConfig`]). Any `Deserialize` type gets [`ConfigLoader`] for free.
//!
//! # Usage
//!
//! ```rust,no_run
//! use orb_common::config::{ConfigLoader, ConfigError, RegistryConfig, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct ToolConfig {
//!     shared: SharedConfig,
//!     #[serde(default)]
//!     registry: RegistryConfig,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = ToolConfig::load(Path::new("orb.toml"))?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::consts::DEFAULT_FLOAT_PRECISION;
use crate::format::FormatOptions;
use crate::registry::DescriptorPolicy;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// Unreadable file or invalid TOML.
    #[error("cannot read config: {0}")]
    ParseError(String),

    /// Well-formed TOML with an out-of-range value.
    #[error("invalid config: {0}")]
    ValidationError(String),
}

/// `log_level` values, spelled in lowercase in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// `[shared]` section: identity and log level of the tool instance.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "orb-listener"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    #[serde(default)]
    pub log_level: LogLevel,

    /// Name attached to log output.
    pub service_name: String,
}

impl SharedConfig {
    /// # Errors
    ///
    /// `ValidationError` for an empty `service_name`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// `[registry]` section: startup registration behaviour.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Treatment of descriptor/size disagreements.
    #[serde(default)]
    pub descriptor_policy: DescriptorPolicy,
}

/// `[output]` section: report rendering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Decimal places for float fields.
    #[serde(default = "default_float_precision")]
    pub float_precision: usize,
}

fn default_float_precision() -> usize {
    DEFAULT_FLOAT_PRECISION
}

/// Upper bound accepted for `float_precision`.
const MAX_FLOAT_PRECISION: usize = 17;

impl OutputConfig {
    /// # Errors
    ///
    /// `ValidationError` if `float_precision` exceeds 17 digits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.float_precision > MAX_FLOAT_PRECISION {
            return Err(ConfigError::ValidationError(format!(
                "float_precision {} exceeds {MAX_FLOAT_PRECISION}",
                self.float_precision
            )));
        }
        Ok(())
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            float_precision: self.float_precision,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            float_precision: DEFAULT_FLOAT_PRECISION,
        }
    }
}

/// TOML loading for any deserializable config type.
///
/// Loading only parses; callers run their own `validate`.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// `FileNotFound` for a missing file, `ParseError` for anything else.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
            _ => ConfigError::ParseError(format!("{}: {e}", path.display())),
        })?;

        Self::from_toml(&content)
    }

    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
