//! Diagnostic output shared by `validate` and `config check`.

use depcheck::config::validate::{count_level, Diagnostic, DiagnosticLevel};

/// Print every diagnostic and a summary line. Returns the error count.
pub(crate) fn print_diagnostics(diagnostics: &[Diagnostic], clean: &str) -> usize {
    for diag in diagnostics {
        println!("{}", diag);
    }

    let errors = count_level(diagnostics, DiagnosticLevel::Error);
    let warnings = count_level(diagnostics, DiagnosticLevel::Warn);
    if errors == 0 && warnings == 0 {
        println!("\n{}", clean);
    } else {
        println!("\nFound {} error(s), {} warning(s)", errors, warnings);
    }
    errors
}
