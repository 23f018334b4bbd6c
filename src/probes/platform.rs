//! Platform command strategies.
//!
//! The service manager and ping syntax differ between systemd hosts and
//! Windows. Each platform is one [`PlatformCommands`] implementation, picked
//! once by [`detect_platform`].

use std::sync::Arc;

use super::command::{CommandLine, CommandOutput};

/// Command syntax for one host platform.
pub trait PlatformCommands: Send + Sync + std::fmt::Debug {
    /// Short platform label for logs.
    fn name(&self) -> &'static str;

    /// Command that reports whether `service` is running.
    fn service_status(&self, service: &str) -> CommandLine;

    /// Interpret the output of [`Self::service_status`].
    fn is_service_running(&self, output: &CommandOutput) -> bool;

    /// Command that starts `service`.
    fn service_start(&self, service: &str) -> CommandLine;

    /// Command that sends a single ICMP echo to `host`.
    fn ping(&self, host: &str) -> CommandLine;
}

/// systemd hosts (`systemctl`, `ping -c 1`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Systemd;

impl PlatformCommands for Systemd {
    fn name(&self) -> &'static str {
        "systemd"
    }

    fn service_status(&self, service: &str) -> CommandLine {
        CommandLine::new("systemctl", ["is-active", service])
    }

    fn is_service_running(&self, output: &CommandOutput) -> bool {
        output.success()
    }

    fn service_start(&self, service: &str) -> CommandLine {
        CommandLine::new("systemctl", ["start", service])
    }

    fn ping(&self, host: &str) -> CommandLine {
        CommandLine::new("ping", ["-c", "1", host])
    }
}

/// Windows hosts (`sc`, `ping -n 1`).
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsSc;

impl PlatformCommands for WindowsSc {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn service_status(&self, service: &str) -> CommandLine {
        CommandLine::new("sc", ["query", service])
    }

    /// `sc query` exits 0 for stopped services too; only the STATE row counts.
    fn is_service_running(&self, output: &CommandOutput) -> bool {
        output
            .stdout
            .lines()
            .any(|line| line.contains("STATE") && line.contains("RUNNING"))
    }

    fn service_start(&self, service: &str) -> CommandLine {
        CommandLine::new("sc", ["start", service])
    }

    fn ping(&self, host: &str) -> CommandLine {
        CommandLine::new("ping", ["-n", "1", host])
    }
}

/// Pick the command strategy for the host this binary was built for.
pub fn detect_platform() -> Arc<dyn PlatformCommands> {
    if cfg!(target_os = "windows") {
        Arc::new(WindowsSc)
    } else {
        Arc::new(Systemd)
    }
}
