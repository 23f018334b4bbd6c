//! Configuration type definitions for depcheck
//!
//! All types implement serde traits for JSON serialization and have sensible defaults.

use serde::{Deserialize, Serialize};

/// Main configuration struct for depcheck
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging output configuration
    pub logging: LoggingConfig,
    /// Probe timeouts
    pub probes: ProbesConfig,
    /// Evaluation behaviour
    pub evaluation: EvaluationConfig,
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable multi-line output
    Pretty,
    /// Compact single-line output with a `component` field
    #[default]
    Component,
    /// JSON lines for log aggregators
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "component" => Ok(LogFormat::Component),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Default filter level when `RUST_LOG` is unset
    pub level: String,
    /// Optional file to append log lines to (stderr otherwise)
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Component,
            level: "info".to_string(),
            file: None,
        }
    }
}

// ============================================================================
// Probe Configuration
// ============================================================================

/// Default TCP connect timeout for port probes.
pub const DEFAULT_PORT_TIMEOUT_SECS: u64 = 3;

/// Default upper bound for `systemctl`, `sc` and `ping` invocations.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Probe timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbesConfig {
    /// TCP connect timeout in seconds
    pub port_timeout_secs: u64,
    /// Timeout for external service-manager and ping commands in seconds
    pub command_timeout_secs: u64,
}

impl Default for ProbesConfig {
    fn default() -> Self {
        Self {
            port_timeout_secs: DEFAULT_PORT_TIMEOUT_SECS,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
        }
    }
}

// ============================================================================
// Evaluation Configuration
// ============================================================================

/// Evaluation behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Probe independent dependencies concurrently. Reporting order is unchanged.
    pub parallel: bool,
}
