//! Manifest validation.
//!
//! Runs on the untyped document so every problem is reported at once, with
//! the path of the offending entry, before anything is probed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::config::validate::{check_unknown_keys, Diagnostic, DiagnosticLevel};
use crate::manifest::type_label;

const KNOWN_TOP_LEVEL: &[&str] = &["service", "dependencies"];

const KNOWN_DEPENDENCY_FIELDS: &[&str] =
    &["type", "name", "host", "port", "retries", "delay", "auto_fix"];

const KNOWN_TYPES: &[&str] = &["service", "port", "ping"];

/// Service names are handed to `systemctl` / `sc` as a single argument.
/// A leading `-` would be read as an option.
static SERVICE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_@][A-Za-z0-9_@.:-]*$").expect("valid regex"));

/// Host names, IPv4 and IPv6 literals (optionally bracketed, with zone id).
static HOST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\[:][A-Za-z0-9_.:%\[\]-]*$").expect("valid regex"));

/// Validate a raw manifest document.
pub fn validate_manifest(raw: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match raw.as_object() {
        Some(o) => o,
        None => {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                "",
                "Manifest must be a mapping with a `dependencies` list",
            ));
            return diagnostics;
        }
    };

    check_unknown_keys(obj, KNOWN_TOP_LEVEL, "", DiagnosticLevel::Warn, &mut diagnostics);

    if let Some(service) = obj.get("service") {
        if !service.is_string() {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                "service",
                "Must be a string",
            ));
        }
    }

    let deps = match obj.get("dependencies") {
        Some(Value::Array(deps)) => deps,
        Some(_) => {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                "dependencies",
                "Must be a list",
            ));
            return diagnostics;
        }
        None => {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                "dependencies",
                "Missing required field",
            ));
            return diagnostics;
        }
    };

    if deps.is_empty() {
        diagnostics.push(Diagnostic::new(
            DiagnosticLevel::Warn,
            "dependencies",
            "Empty list, nothing will be checked",
        ));
    }

    for (i, dep) in deps.iter().enumerate() {
        validate_dependency(i, dep, &mut diagnostics);
    }

    if !diagnostics
        .iter()
        .any(|d| d.level == DiagnosticLevel::Error)
    {
        diagnostics.push(Diagnostic::new(
            DiagnosticLevel::Ok,
            "",
            format!("{} dependencies declared", deps.len()),
        ));
    }

    diagnostics
}

fn validate_dependency(index: usize, dep: &Value, diagnostics: &mut Vec<Diagnostic>) {
    let path = format!("dependencies[{}]", index);

    let obj = match dep.as_object() {
        Some(o) => o,
        None => {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                path,
                "Dependency must be a mapping",
            ));
            return;
        }
    };

    check_unknown_keys(
        obj,
        KNOWN_DEPENDENCY_FIELDS,
        &path,
        DiagnosticLevel::Warn,
        diagnostics,
    );

    let dep_type = obj.get("type").and_then(|v| v.as_str());

    match dep_type {
        None => {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Warn,
                format!("{}.type", path),
                format!(
                    "Missing or not a string; it will be reported as unknown ({})",
                    type_label(obj.get("type"))
                ),
            ));
        }
        Some("service") => {
            if let Some(name) = require_str(obj.get("name"), &path, "name", diagnostics) {
                if !SERVICE_NAME_RE.is_match(name) {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticLevel::Error,
                        format!("{}.name", path),
                        format!("'{}' is not a valid service name", name),
                    ));
                }
            }
        }
        Some("port") => {
            check_host(obj.get("host"), &path, diagnostics);
            match obj.get("port").map(port_number) {
                None => diagnostics.push(Diagnostic::new(
                    DiagnosticLevel::Error,
                    format!("{}.port", path),
                    "Missing required field",
                )),
                Some(Some(p)) if (1..=65535).contains(&p) => {}
                Some(_) => diagnostics.push(Diagnostic::new(
                    DiagnosticLevel::Error,
                    format!("{}.port", path),
                    "Must be an integer between 1 and 65535",
                )),
            }
        }
        Some("ping") => {
            check_host(obj.get("host"), &path, diagnostics);
        }
        Some(other) => {
            let hint = crate::config::validate::suggest_field(other, KNOWN_TYPES)
                .map(|s| format!(", {}", s))
                .unwrap_or_default();
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Warn,
                format!("{}.type", path),
                format!(
                    "Unknown type '{}'{}; it will be reported as an invalid type",
                    other, hint
                ),
            ));
        }
    }

    if let Some(retries) = obj.get("retries") {
        match retries.as_u64() {
            Some(0) => diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Warn,
                format!("{}.retries", path),
                "Zero retries, treated as a single attempt",
            )),
            Some(n) if n <= u64::from(u32::MAX) => {}
            _ => diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                format!("{}.retries", path),
                "Must be a positive integer",
            )),
        }
    }

    if let Some(delay) = obj.get("delay") {
        match delay.as_f64() {
            Some(d) if d >= 0.0 && d.is_finite() => {}
            _ => diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                format!("{}.delay", path),
                "Must be a non-negative number of seconds",
            )),
        }
    }

    if let Some(auto_fix) = obj.get("auto_fix") {
        if !auto_fix.is_boolean() {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                format!("{}.auto_fix", path),
                "Must be true or false",
            ));
        } else if auto_fix.as_bool() == Some(true) && dep_type != Some("service") {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Warn,
                format!("{}.auto_fix", path),
                "Only service dependencies can be fixed automatically; ignored",
            ));
        }
    }
}

/// Ports may be written as numbers or numeric strings.
fn port_number(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_u64(),
    }
}

fn require_str<'a>(
    value: Option<&'a Value>,
    path: &str,
    field: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<&'a str> {
    match value.and_then(|v| v.as_str()) {
        Some(s) if !s.trim().is_empty() => Some(s),
        _ => {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                format!("{}.{}", path, field),
                "Missing required field",
            ));
            None
        }
    }
}

fn check_host(value: Option<&Value>, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    if let Some(host) = require_str(value, path, "host", diagnostics) {
        if !HOST_RE.is_match(host) {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                format!("{}.host", path),
                format!("'{}' is not a valid host name or address", host),
            ));
        }
    }
}
