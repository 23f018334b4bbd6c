//! Configuration validation with unknown field detection.
//!
//! The [`Diagnostic`] type and the "did you mean?" helpers are shared with
//! manifest validation in [`crate::manifest::validate`].

use serde_json::{Map, Value};
use std::collections::HashSet;

/// Known top-level config field names.
const KNOWN_TOP_LEVEL: &[&str] = &["logging", "probes", "evaluation"];

const KNOWN_LOGGING: &[&str] = &["format", "level", "file"];

const KNOWN_PROBES: &[&str] = &["port_timeout_secs", "command_timeout_secs"];

const KNOWN_EVALUATION: &[&str] = &["parallel"];

const KNOWN_LOG_FORMATS: &[&str] = &["pretty", "component", "json"];

/// A validation diagnostic.
#[derive(Debug)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticLevel {
    Ok,
    Warn,
    Error,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            DiagnosticLevel::Ok => "[OK]",
            DiagnosticLevel::Warn => "[WARN]",
            DiagnosticLevel::Error => "[ERROR]",
        };
        if self.path.is_empty() {
            write!(f, "{} {}", prefix, self.message)
        } else {
            write!(f, "{} {}: {}", prefix, self.path, self.message)
        }
    }
}

/// Count diagnostics at the given level.
pub fn count_level(diagnostics: &[Diagnostic], level: DiagnosticLevel) -> usize {
    diagnostics.iter().filter(|d| d.level == level).count()
}

/// Simple Levenshtein distance for "did you mean?" suggestions.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut matrix = vec![vec![0usize; b.len() + 1]; a.len() + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, val) in matrix[0].iter_mut().enumerate() {
        *val = j;
    }

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            matrix[i + 1][j + 1] = std::cmp::min(
                std::cmp::min(matrix[i][j + 1] + 1, matrix[i + 1][j] + 1),
                matrix[i][j] + cost,
            );
        }
    }
    matrix[a.len()][b.len()]
}

/// Suggest the closest known field name (if distance <= 3).
pub fn suggest_field(unknown: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(k, _)| format!("did you mean '{}'?", k))
}

/// Report every key of `obj` not in `known`. Returns `true` if any was found.
pub fn check_unknown_keys(
    obj: &Map<String, Value>,
    known: &[&str],
    prefix: &str,
    level: DiagnosticLevel,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let known_set: HashSet<&str> = known.iter().copied().collect();
    let mut has_unknown = false;
    for key in obj.keys() {
        if known_set.contains(key.as_str()) {
            continue;
        }
        has_unknown = true;
        let msg = match suggest_field(key, known) {
            Some(suggestion) => format!("Unknown field '{}', {}", key, suggestion),
            None => format!("Unknown field '{}'", key),
        };
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        diagnostics.push(Diagnostic {
            level,
            path,
            message: msg,
        });
    }
    has_unknown
}

/// Validate a raw JSON config value against known field names.
pub fn validate_config(raw: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match raw.as_object() {
        Some(o) => o,
        None => {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                "",
                "Config must be a JSON object",
            ));
            return diagnostics;
        }
    };

    diagnostics.push(Diagnostic::new(DiagnosticLevel::Ok, "", "Valid JSON"));

    let mut has_unknown =
        check_unknown_keys(obj, KNOWN_TOP_LEVEL, "", DiagnosticLevel::Error, &mut diagnostics);

    let sections: [(&str, &[&str]); 3] = [
        ("logging", KNOWN_LOGGING),
        ("probes", KNOWN_PROBES),
        ("evaluation", KNOWN_EVALUATION),
    ];
    for (section, known) in sections {
        if let Some(section_obj) = obj.get(section).and_then(|v| v.as_object()) {
            has_unknown |= check_unknown_keys(
                section_obj,
                known,
                section,
                DiagnosticLevel::Error,
                &mut diagnostics,
            );
        }
    }

    if !has_unknown {
        diagnostics.push(Diagnostic::new(
            DiagnosticLevel::Ok,
            "",
            "All fields recognized",
        ));
    }

    // Value checks
    if let Some(format) = obj
        .get("logging")
        .and_then(|v| v.get("format"))
        .and_then(|v| v.as_str())
    {
        if !KNOWN_LOG_FORMATS.contains(&format) {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                "logging.format",
                format!(
                    "Unknown format '{}', expected one of: {}",
                    format,
                    KNOWN_LOG_FORMATS.join(", ")
                ),
            ));
        }
    }

    if let Some(probes) = obj.get("probes").and_then(|v| v.as_object()) {
        for key in KNOWN_PROBES {
            if probes.get(*key).and_then(|v| v.as_u64()) == Some(0) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticLevel::Warn,
                    format!("probes.{}", key),
                    "Zero timeout, every probe will fail immediately",
                ));
            }
        }
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("hello", "hello"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("hello", "helo"), 1);
    }

    #[test]
    fn test_levenshtein_different() {
        assert!(levenshtein("hello", "world") > 3);
    }

    #[test]
    fn test_suggest_field_match() {
        let result = suggest_field("probs", KNOWN_TOP_LEVEL);
        assert!(result.unwrap().contains("probes"));
    }

    #[test]
    fn test_suggest_field_no_match() {
        assert!(suggest_field("xyzabcdef", KNOWN_TOP_LEVEL).is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let raw = json!({
            "logging": {"level": "debug", "format": "json"},
            "probes": {"port_timeout_secs": 5},
            "evaluation": {"parallel": true}
        });
        let diags = validate_config(&raw);
        assert_eq!(count_level(&diags, DiagnosticLevel::Error), 0);
        assert!(diags.iter().any(|d| d.message == "All fields recognized"));
    }

    #[test]
    fn test_validate_unknown_top_level() {
        let raw = json!({"probez": {}});
        let diags = validate_config(&raw);
        let err = diags
            .iter()
            .find(|d| d.level == DiagnosticLevel::Error)
            .unwrap();
        assert_eq!(err.path, "probez");
        assert!(err.message.contains("did you mean 'probes'?"));
    }

    #[test]
    fn test_validate_unknown_nested_field() {
        let raw = json!({"probes": {"port_timeout": 3}});
        let diags = validate_config(&raw);
        assert!(diags
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error && d.path == "probes.port_timeout"));
    }

    #[test]
    fn test_validate_bad_log_format() {
        let raw = json!({"logging": {"format": "xml"}});
        let diags = validate_config(&raw);
        assert!(diags
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error && d.path == "logging.format"));
    }

    #[test]
    fn test_validate_zero_timeout_warns() {
        let raw = json!({"probes": {"command_timeout_secs": 0}});
        let diags = validate_config(&raw);
        assert_eq!(count_level(&diags, DiagnosticLevel::Warn), 1);
    }

    #[test]
    fn test_validate_not_an_object() {
        let raw = json!("not an object");
        let diags = validate_config(&raw);
        assert!(diags.iter().any(|d| {
            d.level == DiagnosticLevel::Error && d.message.contains("must be a JSON object")
        }));
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::new(DiagnosticLevel::Warn, "probes.x", "careful");
        assert_eq!(d.to_string(), "[WARN] probes.x: careful");
        let d = Diagnostic::new(DiagnosticLevel::Ok, "", "fine");
        assert_eq!(d.to_string(), "[OK] fine");
    }
}
