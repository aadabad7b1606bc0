//! `orb_diagnostic` configuration.
//!
//! ```toml
//! [shared]
//! log_level = "warn"
//! service_name = "orb_diagnostic"
//!
//! [registry]
//! descriptor_policy = "lenient"
//!
//! [output]
//! float_precision = 4
//! ```
//!
//! Every section is optional.

use std::path::Path;

use orb::config::{ConfigError, ConfigLoader, LogLevel, OutputConfig, RegistryConfig, SharedConfig};
use serde::Deserialize;
use tracing::debug;

const SERVICE_NAME: &str = "orb_diagnostic";

/// Level used when no `[shared]` section is configured.
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Warn;

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticConfig {
    #[serde(default = "default_shared")]
    pub shared: SharedConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_shared() -> SharedConfig {
    SharedConfig {
        log_level: DEFAULT_LOG_LEVEL,
        service_name: SERVICE_NAME.to_string(),
    }
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            shared: default_shared(),
            registry: RegistryConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl DiagnosticConfig {
    /// Load and validate `path`, or the defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                debug!(path = %path.display(), "loading configuration");
                Self::load(path)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.output.validate()
    }
}
