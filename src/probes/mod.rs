//! Probe and remediation capabilities.
//!
//! The evaluator only sees the [`Capabilities`] trait: four operations that
//! answer `true`/`false` and never fail. [`HostCapabilities`] is the real
//! implementation; every underlying call returns `Result<bool, ProbeFault>`
//! and passes through [`absorb`], the single place where faults become
//! "unhealthy".

pub mod command;
pub mod platform;
pub mod tcp;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ProbesConfig;
use crate::error::ProbeFault;
use crate::log_component;

pub use command::{run_command, CommandLine, CommandOutput};
pub use platform::{detect_platform, PlatformCommands, Systemd, WindowsSc};

/// Health probes and the service remediation action.
///
/// Implementations must be total: any fault is reported as `false`.
#[async_trait]
pub trait Capabilities: Send + Sync {
    /// Is the named service running?
    async fn probe_service(&self, name: &str) -> bool;

    /// Does `host:port` accept a TCP connection?
    async fn probe_port(&self, host: &str, port: u16) -> bool;

    /// Does `host` answer a single ICMP echo?
    async fn probe_ping(&self, host: &str) -> bool;

    /// Try to start the named service. `true` if the start command succeeded.
    async fn start_service(&self, name: &str) -> bool;
}

/// Normalise a probe result to the boolean contract.
///
/// `Ok(healthy)` passes through. Any [`ProbeFault`] is logged and becomes `false`.
pub fn absorb(probe: &'static str, target: &str, outcome: Result<bool, ProbeFault>) -> bool {
    match outcome {
        Ok(healthy) => {
            debug!(probe, dependency = target, healthy, "Probe finished");
            healthy
        }
        Err(ProbeFault::Spawn(ref msg)) => {
            log_component!(
                warn,
                "probe",
                "Probe command could not be started",
                probe = probe,
                dependency = target,
                error = msg.as_str()
            );
            false
        }
        Err(fault) => {
            debug!(probe, dependency = target, fault = fault.kind(), error = %fault, "Probe fault");
            false
        }
    }
}

/// Capabilities backed by the local host: service manager, ping binary and TCP.
#[derive(Debug, Clone)]
pub struct HostCapabilities {
    platform: Arc<dyn PlatformCommands>,
    port_timeout: Duration,
    command_timeout: Duration,
}

impl HostCapabilities {
    pub fn new(platform: Arc<dyn PlatformCommands>, config: &ProbesConfig) -> Self {
        Self {
            platform,
            port_timeout: Duration::from_secs(config.port_timeout_secs),
            command_timeout: Duration::from_secs(config.command_timeout_secs),
        }
    }

    /// Use the command strategy of the current host platform.
    pub fn detect(config: &ProbesConfig) -> Self {
        Self::new(detect_platform(), config)
    }

    pub fn platform_name(&self) -> &'static str {
        self.platform.name()
    }

    async fn service_running(&self, name: &str) -> Result<bool, ProbeFault> {
        let output = run_command(&self.platform.service_status(name), self.command_timeout).await?;
        Ok(self.platform.is_service_running(&output))
    }

    async fn command_succeeds(&self, command: CommandLine) -> Result<bool, ProbeFault> {
        let output = run_command(&command, self.command_timeout).await?;
        Ok(output.success())
    }
}

#[async_trait]
impl Capabilities for HostCapabilities {
    async fn probe_service(&self, name: &str) -> bool {
        absorb("service", name, self.service_running(name).await)
    }

    async fn probe_port(&self, host: &str, port: u16) -> bool {
        let target = format!("{}:{}", host, port);
        absorb("port", &target, tcp::connect(host, port, self.port_timeout).await)
    }

    async fn probe_ping(&self, host: &str) -> bool {
        absorb("ping", host, self.command_succeeds(self.platform.ping(host)).await)
    }

    async fn start_service(&self, name: &str) -> bool {
        let started = absorb(
            "start_service",
            name,
            self.command_succeeds(self.platform.service_start(name)).await,
        );
        if started {
            log_component!(info, "remediation", "Service start command succeeded", service = name);
        } else {
            log_component!(warn, "remediation", "Service start command failed", service = name);
        }
        started
    }
}
