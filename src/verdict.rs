//! Outcome aggregation.
//!
//! Turns an [`Evaluation`] into the final report. The run succeeds iff the
//! failure list is empty; `changed` is always `false` because a successful
//! remediation is reported through the `fixed` state, not as a change.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::evaluator::{DependencyState, Evaluation, ResultMap};

pub const SUCCESS_MESSAGE: &str = "All dependencies are healthy.";
pub const FAILURE_MESSAGE: &str = "One or more dependencies failed";

/// Final report of a verification run.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub changed: bool,
    pub results: ResultMap,
    pub failed_dependencies: Vec<String>,
    pub message: String,
    #[serde(skip)]
    pub checked_at: DateTime<Utc>,
}

impl Verdict {
    pub fn from_evaluation(evaluation: Evaluation) -> Self {
        let message = if evaluation.failures.is_empty() {
            SUCCESS_MESSAGE
        } else {
            FAILURE_MESSAGE
        };
        Self {
            changed: false,
            results: evaluation.results,
            failed_dependencies: evaluation.failures,
            message: message.to_string(),
            checked_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed_dependencies.is_empty()
    }

    /// Process exit code for this verdict.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable report, one line per dependency.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Dependency check ({})",
            self.checked_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(out);

        if self.results.is_empty() {
            let _ = writeln!(out, "  (no dependencies declared)");
        }
        for (key, state) in self.results.iter() {
            let _ = writeln!(out, "  {:<7} {:<40} {}", icon(state), key, state);
        }

        if !self.failed_dependencies.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Failures:");
            for failure in &self.failed_dependencies {
                let _ = writeln!(out, "  - {}", failure);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.message);
        out
    }
}

fn icon(state: DependencyState) -> &'static str {
    match state {
        DependencyState::Healthy => "[ok]",
        DependencyState::Fixed => "[fixed]",
        DependencyState::Unhealthy | DependencyState::InvalidType => "[ERR]",
    }
}
