//! CLI module: command parsing and dispatch
//!
//! All CLI logic lives here. `main.rs` calls `cli::run()`.

pub mod check;
pub mod config;
pub mod probe;
mod report;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

use depcheck::config::Config;

#[derive(Parser)]
#[command(name = "depcheck")]
#[command(version)]
#[command(about = "Verify that a service's runtime dependencies are healthy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every dependency in a manifest and report the verdict
    Check {
        /// Manifest file (.yaml, .yml, .json or .toml)
        manifest: PathBuf,
        /// Output format for the report
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Probe dependencies concurrently
        #[arg(long)]
        parallel: bool,
    },
    /// Check a manifest for errors without probing anything
    Validate {
        /// Manifest file (.yaml, .yml, .json or .toml)
        manifest: PathBuf,
    },
    /// Run a single probe attempt against one target
    Probe {
        #[command(subcommand)]
        target: ProbeTarget,
    },
    /// Validate configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProbeTarget {
    /// Is a service running?
    Service {
        /// Service name as known to the service manager
        name: String,
    },
    /// Does a TCP port accept connections?
    Port {
        /// Host name or IP address
        host: String,
        /// TCP port
        port: u16,
    },
    /// Does a host answer a single ping?
    Ping {
        /// Host name or IP address
        host: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Check configuration for errors and warnings
    Check,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Entry point for the CLI: called from main().
pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logging follows the config file when it loads; a broken config still
    // gets default logging so the command can report the problem.
    let config = Config::load();
    let logging_cfg = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    depcheck::utils::init_logging(&logging_cfg)?;

    match cli.command {
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
        }
        Some(Commands::Version) => {
            cmd_version();
        }
        Some(Commands::Check {
            manifest,
            format,
            parallel,
        }) => {
            check::cmd_check(config?, &manifest, format, parallel).await?;
        }
        Some(Commands::Validate { manifest }) => {
            validate::cmd_validate(&manifest)?;
        }
        Some(Commands::Probe { target }) => {
            probe::cmd_probe(config?, target).await?;
        }
        Some(Commands::Config { action }) => {
            config::cmd_config(action)?;
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("depcheck {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Dependency health verification for services");
}
