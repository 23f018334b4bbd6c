//! depcheck - dependency health verification for services
//!
//! A manifest lists what a service needs at runtime (other services, TCP
//! ports, reachable hosts). Each entry is probed with a bounded retry policy,
//! inactive services may be started automatically, and the outcome is
//! reported as a per-dependency result map plus a pass/fail verdict.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod manifest;
pub mod probes;
pub mod retry;
pub mod utils;
pub mod verdict;

pub use config::Config;
pub use error::{DepcheckError, ProbeFault, Result};
pub use evaluator::{DependencyState, Evaluation, Evaluator, ResultMap};
pub use manifest::{DependencyKind, DependencySpec, Manifest};
pub use probes::{Capabilities, HostCapabilities};
pub use retry::{run_with_retry, RetryPolicy};
pub use verdict::Verdict;
