//! `depcheck validate`: manifest diagnostics without probing.

use std::path::Path;

use anyhow::Result;

use depcheck::manifest::validate::validate_manifest;
use depcheck::manifest::Manifest;

use super::report::print_diagnostics;

pub(crate) fn cmd_validate(manifest_path: &Path) -> Result<()> {
    println!("Manifest: {}", manifest_path.display());

    let raw = match Manifest::read_raw(manifest_path) {
        Ok(raw) => raw,
        Err(e) => {
            println!("[ERROR] {}", e);
            std::process::exit(1);
        }
    };

    if print_diagnostics(&validate_manifest(&raw), "Manifest looks good!") > 0 {
        std::process::exit(1);
    }
    Ok(())
}
