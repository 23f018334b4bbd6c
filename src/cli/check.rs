//! `depcheck check`: evaluate a manifest and print the verdict.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use depcheck::config::validate::{count_level, DiagnosticLevel};
use depcheck::config::Config;
use depcheck::evaluator::Evaluator;
use depcheck::manifest::validate::validate_manifest;
use depcheck::manifest::Manifest;
use depcheck::probes::HostCapabilities;
use depcheck::verdict::Verdict;

use super::OutputFormat;

pub(crate) async fn cmd_check(
    config: Config,
    manifest_path: &Path,
    format: OutputFormat,
    parallel: bool,
) -> Result<()> {
    let raw = Manifest::read_raw(manifest_path)
        .with_context(|| format!("Failed to read manifest {}", manifest_path.display()))?;

    // Structural problems stop the run before anything is probed.
    let diagnostics = validate_manifest(&raw);
    for diag in diagnostics.iter().filter(|d| d.level != DiagnosticLevel::Ok) {
        eprintln!("{}", diag);
    }
    let errors = count_level(&diagnostics, DiagnosticLevel::Error);
    if errors > 0 {
        bail!(
            "Manifest {} has {} error(s)",
            manifest_path.display(),
            errors
        );
    }

    let manifest = Manifest::from_value(raw)
        .with_context(|| format!("Invalid manifest {}", manifest_path.display()))?;

    let capabilities = HostCapabilities::detect(&config.probes);
    let parallel = parallel || config.evaluation.parallel;
    info!(
        service = manifest.service.as_deref().unwrap_or("-"),
        dependencies = manifest.dependencies.len(),
        platform = capabilities.platform_name(),
        parallel,
        "Starting dependency check"
    );

    let evaluator = Evaluator::new(Arc::new(capabilities)).with_parallel(parallel);
    let evaluation = evaluator.evaluate(&manifest.dependencies).await;
    let verdict = Verdict::from_evaluation(evaluation);

    match format {
        OutputFormat::Json => println!("{}", verdict.to_json()?),
        OutputFormat::Text => {
            if let Some(service) = &manifest.service {
                println!("Service: {}", service);
            }
            print!("{}", verdict.render_text());
        }
    }

    if !verdict.is_success() {
        std::process::exit(verdict.exit_code());
    }
    Ok(())
}
