//! Logging initialization for depcheck.
//!
//! Supports three formats:
//! - `pretty`: multi-line human-readable output
//! - `component`: compact single-line output; use the [`log_component!`] macro
//!   to add a `component` field (`probe`, `retry`, `evaluator`, `remediation`)
//! - `json`: structured JSON lines for log aggregators
//!
//! Logs always go to stderr (or the configured file) so stdout stays free for
//! the verdict.

use std::fs::{File, OpenOptions};
use std::io;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{DepcheckError, Result};

/// Initialize the global tracing subscriber from config.
///
/// Call this once at startup before any tracing events are emitted.
/// `RUST_LOG` takes precedence over `cfg.level` when set.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cfg.level).map_err(|e| {
            DepcheckError::Config(format!("invalid log level '{}': {}", cfg.level, e))
        })?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match (&cfg.format, open_log_file(cfg)?) {
        (LogFormat::Json, Some(file)) => builder
            .json()
            .with_writer(file)
            .with_ansi(false)
            .try_init(),
        (LogFormat::Json, None) => builder.json().with_writer(io::stderr).try_init(),
        (LogFormat::Pretty, Some(file)) => builder
            .pretty()
            .with_writer(file)
            .with_ansi(false)
            .try_init(),
        (LogFormat::Pretty, None) => builder.pretty().with_writer(io::stderr).try_init(),
        (LogFormat::Component, Some(file)) => builder
            .compact()
            .with_target(false)
            .with_writer(file)
            .with_ansi(false)
            .try_init(),
        (LogFormat::Component, None) => builder
            .compact()
            .with_target(false)
            .with_writer(io::stderr)
            .try_init(),
    };

    installed.map_err(|e| DepcheckError::Config(format!("failed to install logger: {}", e)))
}

fn open_log_file(cfg: &LoggingConfig) -> Result<Option<Arc<File>>> {
    let Some(path) = &cfg.file else {
        return Ok(None);
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Some(Arc::new(file)))
}

/// Emit a component-tagged tracing event.
///
/// Works with any tracing level (`trace`, `debug`, `info`, `warn`, `error`).
///
/// ```
/// # use depcheck::log_component;
/// log_component!(info, "evaluator", "dependency checked");
/// log_component!(warn, "retry", "attempt failed", attempt = 1u32, of = 3u32);
/// ```
#[macro_export]
macro_rules! log_component {
    ($level:ident, $component:expr, $msg:expr) => {
        tracing::$level!(component = $component, $msg)
    };
    ($level:ident, $component:expr, $msg:expr, $($key:ident = $val:expr),+ $(,)?) => {
        tracing::$level!(component = $component, $($key = $val,)+ $msg)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.format, LogFormat::Component);
        assert_eq!(cfg.level, "info");
        assert!(cfg.file.is_none());
    }

    #[test]
    fn test_open_log_file_none_without_path() {
        let cfg = LoggingConfig::default();
        assert!(open_log_file(&cfg).unwrap().is_none());
    }

    #[test]
    fn test_open_log_file_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depcheck.log");
        let cfg = LoggingConfig {
            file: Some(path.to_string_lossy().to_string()),
            ..Default::default()
        };
        assert!(open_log_file(&cfg).unwrap().is_some());
        assert!(path.exists());
    }

    #[test]
    fn test_open_log_file_missing_directory_errors() {
        let cfg = LoggingConfig {
            file: Some("/nonexistent/depcheck/depcheck.log".to_string()),
            ..Default::default()
        };
        assert!(matches!(open_log_file(&cfg), Err(DepcheckError::Io(_))));
    }

    #[test]
    fn test_log_component_macro_compiles_without_subscriber() {
        crate::log_component!(info, "evaluator", "no subscriber");
        crate::log_component!(debug, "probe", "with fields", port = 5432u16, host = "db");
    }
}
