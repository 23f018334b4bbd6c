//! `depcheck probe`: one probe attempt for troubleshooting.

use anyhow::Result;

use depcheck::config::Config;
use depcheck::manifest::DependencySpec;
use depcheck::probes::{Capabilities, HostCapabilities};

use super::ProbeTarget;

pub(crate) async fn cmd_probe(config: Config, target: ProbeTarget) -> Result<()> {
    let caps = HostCapabilities::detect(&config.probes);

    let (key, healthy) = match &target {
        ProbeTarget::Service { name } => (
            DependencySpec::service(name.as_str()).key(),
            caps.probe_service(name).await,
        ),
        ProbeTarget::Port { host, port } => (
            DependencySpec::port(host.as_str(), *port).key(),
            caps.probe_port(host, *port).await,
        ),
        ProbeTarget::Ping { host } => (
            DependencySpec::ping(host.as_str()).key(),
            caps.probe_ping(host).await,
        ),
    };

    if healthy {
        println!("[ok]  {} healthy ({})", key, caps.platform_name());
        Ok(())
    } else {
        println!("[ERR] {} unhealthy ({})", key, caps.platform_name());
        std::process::exit(1);
    }
}
