//! Dependency manifest: the declared list of dependencies to verify.
//!
//! A manifest is a YAML, JSON or TOML document:
//!
//! ```yaml
//! service: api
//! dependencies:
//!   - type: service
//!     name: nginx
//!     retries: 2
//!     delay: 1
//!     auto_fix: true
//!   - type: port
//!     host: 10.0.0.5
//!     port: 5432
//!   - type: ping
//!     host: 10.0.0.9
//! ```
//!
//! Entries whose `type` is unrecognised, missing or not a string are kept as
//! [`DependencyKind::Unknown`]
//! so the evaluator can report them; a known type missing its required fields
//! fails to load.

pub mod validate;

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DepcheckError, Result};
use crate::retry::RetryPolicy;

/// What to check, selected by the `type` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyKind {
    /// A service managed by systemd or the Windows service control manager.
    Service { name: String },
    /// A TCP endpoint that must accept connections.
    Port { host: String, port: u16 },
    /// A host that must answer a single ICMP echo.
    Ping { host: String },
    /// An unrecognised `type`. Never probed, always reported as invalid.
    Unknown { type_name: String },
}

impl DependencyKind {
    /// The `type` tag as written in the manifest.
    pub fn type_name(&self) -> &str {
        match self {
            DependencyKind::Service { .. } => "service",
            DependencyKind::Port { .. } => "port",
            DependencyKind::Ping { .. } => "ping",
            DependencyKind::Unknown { type_name } => type_name,
        }
    }

    /// Result key, e.g. `nginx (service)` or `10.0.0.5:5432 (port)`.
    pub fn key(&self) -> String {
        match self {
            DependencyKind::Service { name } => format!("{} (service)", name),
            DependencyKind::Port { host, port } => format!("{}:{} (port)", host, port),
            DependencyKind::Ping { host } => format!("{} (ping)", host),
            DependencyKind::Unknown { type_name } => format!("unknown ({})", type_name),
        }
    }
}

/// One declared dependency.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawDependency")]
pub struct DependencySpec {
    pub kind: DependencyKind,
    pub retry: RetryPolicy,
    /// Try to start the service when it stays inactive. Service dependencies only.
    pub auto_fix: bool,
}

impl DependencySpec {
    /// A dependency with the default policy: one attempt, no delay, no auto-fix.
    pub fn new(kind: DependencyKind) -> Self {
        Self {
            kind,
            retry: RetryPolicy::default(),
            auto_fix: false,
        }
    }

    pub fn service(name: impl Into<String>) -> Self {
        Self::new(DependencyKind::Service { name: name.into() })
    }

    pub fn port(host: impl Into<String>, port: u16) -> Self {
        Self::new(DependencyKind::Port {
            host: host.into(),
            port,
        })
    }

    pub fn ping(host: impl Into<String>) -> Self {
        Self::new(DependencyKind::Ping { host: host.into() })
    }

    pub fn with_retry(mut self, retries: u32, delay: Duration) -> Self {
        self.retry = RetryPolicy::new(retries, delay);
        self
    }

    pub fn with_auto_fix(mut self, auto_fix: bool) -> Self {
        self.auto_fix = auto_fix;
        self
    }

    pub fn key(&self) -> String {
        self.kind.key()
    }
}

/// Wire shape of a dependency before the `type` tag is resolved.
#[derive(Debug, Deserialize)]
struct RawDependency {
    #[serde(rename = "type")]
    dep_type: Option<Value>,
    name: Option<String>,
    host: Option<String>,
    port: Option<PortValue>,
    #[serde(default = "default_retries")]
    retries: u32,
    #[serde(default)]
    delay: f64,
    #[serde(default)]
    auto_fix: bool,
}

/// Ports are accepted as numbers or numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u16),
    Text(String),
}

fn default_retries() -> u32 {
    1
}

/// How a `type` value appears in result keys. Absent or null renders as
/// `None`; non-string values render as JSON.
pub fn type_label(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl TryFrom<RawDependency> for DependencySpec {
    type Error = String;

    fn try_from(raw: RawDependency) -> std::result::Result<Self, Self::Error> {
        let dep_type = type_label(raw.dep_type.as_ref());
        let is_string = matches!(raw.dep_type, Some(Value::String(_)));

        let kind = match dep_type.as_str() {
            _ if !is_string => DependencyKind::Unknown {
                type_name: dep_type,
            },
            "service" => DependencyKind::Service {
                name: require(raw.name, "service", "name")?,
            },
            "port" => DependencyKind::Port {
                host: require(raw.host, "port", "host")?,
                port: parse_port(raw.port)?,
            },
            "ping" => DependencyKind::Ping {
                host: require(raw.host, "ping", "host")?,
            },
            _ => DependencyKind::Unknown {
                type_name: dep_type,
            },
        };

        let delay = Duration::try_from_secs_f64(raw.delay)
            .map_err(|_| format!("delay must be a non-negative number of seconds, got {}", raw.delay))?;

        Ok(DependencySpec {
            kind,
            retry: RetryPolicy::new(raw.retries, delay),
            auto_fix: raw.auto_fix,
        })
    }
}

fn parse_port(port: Option<PortValue>) -> std::result::Result<u16, String> {
    match port {
        None => Err("port dependency requires `port`".to_string()),
        Some(PortValue::Number(n)) => Ok(n),
        Some(PortValue::Text(text)) => text
            .trim()
            .parse()
            .map_err(|_| format!("port must be an integer between 1 and 65535, got '{}'", text)),
    }
}

fn require(field: Option<String>, dep_type: &str, field_name: &str) -> std::result::Result<String, String> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(format!(
            "{} dependency requires `{}`",
            dep_type, field_name
        )),
    }
}

// ============================================================================
// Manifest
// ============================================================================

/// Document format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
    Toml,
}

impl ManifestFormat {
    /// Detect the format from a path. Unknown extensions are read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => ManifestFormat::Json,
            Some("toml") => ManifestFormat::Toml,
            _ => ManifestFormat::Yaml,
        }
    }
}

/// A parsed dependency manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// The service whose dependencies are listed. Informational only.
    #[serde(default)]
    pub service: Option<String>,
    pub dependencies: Vec<DependencySpec>,
}

impl Manifest {
    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = Self::read_raw(path)?;
        Self::from_value(raw)
    }

    /// Read a manifest file into an untyped document, for validation.
    pub fn read_raw(path: &Path) -> Result<Value> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_raw(&content, ManifestFormat::from_path(path))
    }

    /// Parse manifest text into an untyped document.
    pub fn parse_raw(content: &str, format: ManifestFormat) -> Result<Value> {
        let value = match format {
            ManifestFormat::Yaml => serde_yaml::from_str(content)?,
            ManifestFormat::Json => serde_json::from_str(content)?,
            ManifestFormat::Toml => toml::from_str(content)?,
        };
        Ok(value)
    }

    /// Build a typed manifest from an untyped document.
    pub fn from_value(raw: Value) -> Result<Self> {
        serde_json::from_value(raw).map_err(|e| DepcheckError::Manifest(e.to_string()))
    }
}
