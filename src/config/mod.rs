//! Configuration management for depcheck
//!
//! Configuration is loaded from `~/.depcheck/config.json` with environment variable overrides.
//! A missing file is not an error: defaults apply.

mod types;
pub mod validate;

pub use types::*;

use crate::error::{DepcheckError, Result};
use std::path::{Path, PathBuf};

impl Config {
    /// Returns the depcheck configuration directory path (~/.depcheck)
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".depcheck")
    }

    /// Returns the path to the config file (~/.depcheck/config.json)
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables follow the pattern: DEPCHECK_SECTION_KEY
    fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging
        if let Ok(val) = std::env::var("DEPCHECK_LOGGING_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("DEPCHECK_LOGGING_FORMAT") {
            self.logging.format = val.parse().map_err(DepcheckError::Config)?;
        }
        if let Ok(val) = std::env::var("DEPCHECK_LOGGING_FILE") {
            self.logging.file = Some(val);
        }

        // Probes
        if let Ok(val) = std::env::var("DEPCHECK_PROBES_PORT_TIMEOUT_SECS") {
            self.probes.port_timeout_secs = parse_override("DEPCHECK_PROBES_PORT_TIMEOUT_SECS", &val)?;
        }
        if let Ok(val) = std::env::var("DEPCHECK_PROBES_COMMAND_TIMEOUT_SECS") {
            self.probes.command_timeout_secs =
                parse_override("DEPCHECK_PROBES_COMMAND_TIMEOUT_SECS", &val)?;
        }

        // Evaluation
        if let Ok(val) = std::env::var("DEPCHECK_EVALUATION_PARALLEL") {
            self.evaluation.parallel = parse_override("DEPCHECK_EVALUATION_PARALLEL", &val)?;
        }

        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(var: &str, val: &str) -> Result<T> {
    val.trim()
        .parse()
        .map_err(|_| DepcheckError::Config(format!("{} has invalid value '{}'", var, val)))
}
