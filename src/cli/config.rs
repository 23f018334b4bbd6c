//! `depcheck config check`: diagnostics for `~/.depcheck/config.json` and the
//! effective probe settings once `DEPCHECK_*` overrides are applied.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use depcheck::config::validate::validate_config;
use depcheck::config::Config;

use super::report::print_diagnostics;
use super::ConfigAction;

pub(crate) fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Check => check_config_file(&Config::path()),
    }
}

fn check_config_file(path: &Path) -> Result<()> {
    println!("Config file: {}", path.display());

    let errors = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match serde_json::from_str::<Value>(&content) {
            Ok(raw) => print_diagnostics(&validate_config(&raw), "Configuration looks good!"),
            Err(e) => {
                println!("[ERROR] Invalid JSON: {}", e);
                1
            }
        }
    } else {
        println!("[OK] No config file found (using defaults)");
        0
    };

    if errors > 0 {
        std::process::exit(1);
    }

    let config = Config::load_from_path(path).context("Failed to apply environment overrides")?;
    println!();
    println!("Effective settings:");
    println!("  port timeout:    {}s", config.probes.port_timeout_secs);
    println!("  command timeout: {}s", config.probes.command_timeout_secs);
    println!("  parallel:        {}", config.evaluation.parallel);
    println!("  log level:       {}", config.logging.level);
    Ok(())
}
