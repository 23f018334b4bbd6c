//! Error types for depcheck
//!
//! Two families live here:
//! - [`DepcheckError`]: configuration and manifest failures that stop a run
//!   before any dependency is evaluated.
//! - [`ProbeFault`]: low-level faults raised inside a probe. These never leave
//!   the probe boundary; [`crate::probes::absorb`] turns every one of them into
//!   an unhealthy outcome.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Probe Fault Classification
// ============================================================================

/// A fault raised while executing a single probe attempt.
#[derive(Debug)]
pub enum ProbeFault {
    /// The external command could not be spawned (missing binary, permissions)
    Spawn(String),
    /// The command or connection did not finish within the allotted time
    Timeout(Duration),
    /// The TCP connection was refused or reset
    Connect(String),
    /// Host name could not be resolved
    Resolve(String),
}

impl fmt::Display for ProbeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFault::Spawn(msg) => write!(f, "Spawn error: {}", msg),
            ProbeFault::Timeout(d) => write!(f, "Timed out after {}s", d.as_secs_f64()),
            ProbeFault::Connect(msg) => write!(f, "Connection error: {}", msg),
            ProbeFault::Resolve(msg) => write!(f, "Resolution error: {}", msg),
        }
    }
}

impl std::error::Error for ProbeFault {}

impl ProbeFault {
    /// Short machine-friendly label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeFault::Spawn(_) => "spawn",
            ProbeFault::Timeout(_) => "timeout",
            ProbeFault::Connect(_) => "connect",
            ProbeFault::Resolve(_) => "resolve",
        }
    }
}

// ============================================================================
// Primary Error Type
// ============================================================================

/// The primary error type for depcheck operations.
#[derive(Error, Debug)]
pub enum DepcheckError {
    /// Configuration-related errors (invalid config file, bad override values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dependency manifest errors (missing required field, unsupported format)
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A specialized `Result` type for depcheck operations.
pub type Result<T> = std::result::Result<T, DepcheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DepcheckError::Config("bad level".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad level");
    }

    #[test]
    fn test_manifest_error_display() {
        let err = DepcheckError::Manifest("service dependency requires `name`".to_string());
        assert_eq!(
            err.to_string(),
            "Manifest error: service dependency requires `name`"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DepcheckError = io_err.into();
        assert!(matches!(err, DepcheckError::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DepcheckError = json_err.into();
        assert!(matches!(err, DepcheckError::Json(_)));
    }

    #[test]
    fn test_probe_fault_display() {
        assert!(ProbeFault::Spawn("no such file".into())
            .to_string()
            .contains("Spawn error"));
        assert!(ProbeFault::Connect("refused".into())
            .to_string()
            .contains("Connection error"));
        assert!(ProbeFault::Resolve("no host".into())
            .to_string()
            .contains("Resolution error"));
        assert_eq!(
            ProbeFault::Timeout(Duration::from_secs(3)).to_string(),
            "Timed out after 3s"
        );
    }

    #[test]
    fn test_probe_fault_kind() {
        assert_eq!(ProbeFault::Spawn("x".into()).kind(), "spawn");
        assert_eq!(ProbeFault::Timeout(Duration::ZERO).kind(), "timeout");
        assert_eq!(ProbeFault::Connect("x".into()).kind(), "connect");
        assert_eq!(ProbeFault::Resolve("x".into()).kind(), "resolve");
    }
}
