//! Retry policy executor.
//!
//! Drives any boolean probe through a bounded number of attempts with a fixed
//! delay between them. The probe is a closure producing a future, so service,
//! port and ping probes all go through the same loop:
//!
//! ```rust,ignore
//! let healthy = run_with_retry(&policy, || caps.probe_port(host, port)).await;
//! ```

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::log_component;

/// How many times to probe and how long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. `retries` is the total number of attempts and is
    /// clamped to at least one.
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self {
            retries: retries.max(1),
            delay,
        }
    }

    /// Total number of attempts (always >= 1).
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Pause between consecutive attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    /// A single attempt with no delay.
    fn default() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// Run `probe` until it reports healthy or the policy's attempts are used up.
///
/// Returns `true` as soon as one attempt succeeds, without sleeping. After an
/// unhealthy attempt the executor sleeps for the policy delay, except after
/// the final attempt.
pub async fn run_with_retry<F, Fut>(policy: &RetryPolicy, mut probe: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for attempt in 1..=policy.retries {
        if probe().await {
            if attempt > 1 {
                debug!(attempt, "Probe recovered after retry");
            }
            return true;
        }

        if attempt < policy.retries {
            log_component!(
                warn,
                "retry",
                "Probe unhealthy, retrying",
                attempt = attempt,
                max_attempts = policy.retries,
                delay_ms = policy.delay.as_millis() as u64
            );
            if !policy.delay.is_zero() {
                tokio::time::sleep(policy.delay).await;
            }
        }
    }

    false
}
