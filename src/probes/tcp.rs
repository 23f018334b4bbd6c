//! TCP reachability.

use std::time::Duration;

use tokio::net::{lookup_host, TcpStream};

use crate::error::ProbeFault;

/// Resolve `host` and try each address until one accepts a connection.
///
/// The whole sequence (resolution included) is bounded by `timeout`. The
/// connection is closed as soon as it is established; no data is exchanged.
pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<bool, ProbeFault> {
    let stream = tokio::time::timeout(timeout, connect_any(host, port))
        .await
        .map_err(|_| ProbeFault::Timeout(timeout))??;
    drop(stream);
    Ok(true)
}

async fn connect_any(host: &str, port: u16) -> Result<TcpStream, ProbeFault> {
    let addrs: Vec<_> = lookup_host((host, port))
        .await
        .map_err(|e| ProbeFault::Resolve(format!("{}: {}", host, e)))?
        .collect();

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(format!("{}: {}", addr, e)),
        }
    }

    Err(match last_err {
        Some(msg) => ProbeFault::Connect(msg),
        None => ProbeFault::Resolve(format!("{}: no addresses", host)),
    })
}
