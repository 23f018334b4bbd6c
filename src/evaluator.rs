//! Dependency evaluator.
//!
//! Walks the declared dependencies in order, probes each one through the
//! retry executor, runs the remediation sequence for services with
//! `auto_fix`, and accumulates the result map and failure list.
//!
//! Dependencies are independent: a failure never stops the batch. With
//! `parallel` enabled the probes run concurrently, but outcomes are still
//! recorded in input order so the report is identical to a sequential run.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{info, Instrument};

use crate::log_component;
use crate::manifest::{DependencyKind, DependencySpec};
use crate::probes::Capabilities;
use crate::retry::run_with_retry;

// ============================================================================
// DependencyState
// ============================================================================

/// Final state of one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyState {
    Healthy,
    Unhealthy,
    /// Was unhealthy, came back after the service was started.
    Fixed,
    /// The declared `type` is not recognised.
    InvalidType,
}

impl DependencyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyState::Healthy => "healthy",
            DependencyState::Unhealthy => "unhealthy",
            DependencyState::Fixed => "fixed",
            DependencyState::InvalidType => "invalid type",
        }
    }

    /// `healthy` and `fixed` count as passing.
    pub fn is_passing(&self) -> bool {
        matches!(self, DependencyState::Healthy | DependencyState::Fixed)
    }
}

impl fmt::Display for DependencyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DependencyState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// ResultMap
// ============================================================================

/// Result key to state, in the order dependencies were declared.
///
/// Inserting an existing key replaces its state and keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMap {
    entries: Vec<(String, DependencyState)>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, state: DependencyState) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = state,
            None => self.entries.push((key, state)),
        }
    }

    pub fn get(&self, key: &str) -> Option<DependencyState> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, state)| *state)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DependencyState)> {
        self.entries.iter().map(|(k, s)| (k.as_str(), *s))
    }
}

impl Serialize for ResultMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, state) in &self.entries {
            map.serialize_entry(key, state)?;
        }
        map.end()
    }
}

// ============================================================================
// Evaluation
// ============================================================================

/// Outcome of evaluating a single dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyOutcome {
    pub key: String,
    pub state: DependencyState,
    /// Failure-list entry; `None` for passing states.
    pub failure: Option<String>,
}

impl DependencyOutcome {
    fn probed(key: String, healthy: bool) -> Self {
        if healthy {
            Self {
                key,
                state: DependencyState::Healthy,
                failure: None,
            }
        } else {
            let failure = Some(format!("{} check failed", key));
            Self {
                key,
                state: DependencyState::Unhealthy,
                failure,
            }
        }
    }

    fn fixed(key: String) -> Self {
        Self {
            key,
            state: DependencyState::Fixed,
            failure: None,
        }
    }

    fn invalid_type(key: String, type_name: &str) -> Self {
        Self {
            key,
            state: DependencyState::InvalidType,
            failure: Some(format!("Unknown dependency type: {}", type_name)),
        }
    }
}

/// Accumulated results of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub results: ResultMap,
    pub failures: Vec<String>,
}

impl Evaluation {
    pub fn record(&mut self, outcome: DependencyOutcome) {
        self.results.insert(outcome.key, outcome.state);
        if let Some(failure) = outcome.failure {
            self.failures.push(failure);
        }
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Evaluates dependency lists against a set of [`Capabilities`].
pub struct Evaluator {
    capabilities: Arc<dyn Capabilities>,
    parallel: bool,
}

impl Evaluator {
    pub fn new(capabilities: Arc<dyn Capabilities>) -> Self {
        Self {
            capabilities,
            parallel: false,
        }
    }

    /// Probe dependencies concurrently. Report order is unaffected.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Evaluate every dependency and collect the results.
    pub async fn evaluate(&self, specs: &[DependencySpec]) -> Evaluation {
        let outcomes = if self.parallel {
            join_all(specs.iter().map(|spec| self.evaluate_one(spec))).await
        } else {
            let mut outcomes = Vec::with_capacity(specs.len());
            for spec in specs {
                outcomes.push(self.evaluate_one(spec).await);
            }
            outcomes
        };

        let mut evaluation = Evaluation::default();
        for outcome in outcomes {
            evaluation.record(outcome);
        }
        evaluation
    }

    /// Evaluate a single dependency.
    pub async fn evaluate_one(&self, spec: &DependencySpec) -> DependencyOutcome {
        let key = spec.key();
        let span = tracing::info_span!("dependency", key = %key);
        let outcome = self.dispatch(spec, key).instrument(span).await;
        info!(
            dependency = %outcome.key,
            state = %outcome.state,
            "Dependency checked"
        );
        outcome
    }

    async fn dispatch(&self, spec: &DependencySpec, key: String) -> DependencyOutcome {
        let caps = &self.capabilities;
        let policy = &spec.retry;

        match &spec.kind {
            DependencyKind::Service { name } => {
                let healthy = run_with_retry(policy, || caps.probe_service(name)).await;
                if !healthy && spec.auto_fix {
                    log_component!(
                        info,
                        "remediation",
                        "Service inactive, attempting to start it",
                        service = name.as_str()
                    );
                    if caps.start_service(name).await
                        && run_with_retry(policy, || caps.probe_service(name)).await
                    {
                        log_component!(
                            info,
                            "remediation",
                            "Service recovered",
                            service = name.as_str()
                        );
                        return DependencyOutcome::fixed(key);
                    }
                }
                DependencyOutcome::probed(key, healthy)
            }
            DependencyKind::Port { host, port } => {
                let healthy = run_with_retry(policy, || caps.probe_port(host, *port)).await;
                DependencyOutcome::probed(key, healthy)
            }
            DependencyKind::Ping { host } => {
                let healthy = run_with_retry(policy, || caps.probe_ping(host)).await;
                DependencyOutcome::probed(key, healthy)
            }
            DependencyKind::Unknown { type_name } => {
                log_component!(
                    warn,
                    "evaluator",
                    "Unknown dependency type",
                    dependency_type = type_name.as_str()
                );
                DependencyOutcome::invalid_type(key, type_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Capabilities answering from per-target scripts. Once a script runs
    /// out, the last answer repeats. Every call is logged.
    #[derive(Default)]
    struct Scripted {
        answers: Mutex<HashMap<String, VecDeque<bool>>>,
        calls: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn answer(self, call: &str, answers: &[bool]) -> Self {
            self.answers
                .lock()
                .unwrap()
                .insert(call.to_string(), answers.iter().copied().collect());
            self
        }

        fn next(&self, call: String) -> bool {
            self.calls.lock().unwrap().push(call.clone());
            let mut answers = self.answers.lock().unwrap();
            match answers.get_mut(&call) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(false),
                Some(queue) => queue.front().copied().unwrap_or(false),
                None => false,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, call: &str) -> usize {
            self.calls().iter().filter(|c| *c == call).count()
        }
    }

    #[async_trait]
    impl Capabilities for Scripted {
        async fn probe_service(&self, name: &str) -> bool {
            self.next(format!("service:{}", name))
        }

        async fn probe_port(&self, host: &str, port: u16) -> bool {
            self.next(format!("port:{}:{}", host, port))
        }

        async fn probe_ping(&self, host: &str) -> bool {
            self.next(format!("ping:{}", host))
        }

        async fn start_service(&self, name: &str) -> bool {
            self.next(format!("start:{}", name))
        }
    }

    fn evaluator(caps: Scripted) -> (Evaluator, Arc<Scripted>) {
        let caps = Arc::new(caps);
        (Evaluator::new(caps.clone()), caps)
    }

    fn unknown(type_name: &str) -> DependencySpec {
        DependencySpec::new(DependencyKind::Unknown {
            type_name: type_name.to_string(),
        })
    }

    #[test]
    fn test_state_strings() {
        assert_eq!(DependencyState::Healthy.to_string(), "healthy");
        assert_eq!(DependencyState::Unhealthy.to_string(), "unhealthy");
        assert_eq!(DependencyState::Fixed.to_string(), "fixed");
        assert_eq!(DependencyState::InvalidType.to_string(), "invalid type");
        assert!(DependencyState::Fixed.is_passing());
        assert!(!DependencyState::InvalidType.is_passing());
    }

    #[test]
    fn test_result_map_keeps_order_and_replaces_in_place() {
        let mut map = ResultMap::new();
        map.insert("b".into(), DependencyState::Healthy);
        map.insert("a".into(), DependencyState::Unhealthy);
        map.insert("b".into(), DependencyState::Unhealthy);

        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(DependencyState::Unhealthy));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_result_map_serializes_as_ordered_object() {
        let mut map = ResultMap::new();
        map.insert("z (ping)".into(), DependencyState::Healthy);
        map.insert("unknown (disk)".into(), DependencyState::InvalidType);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(
            json,
            r#"{"z (ping)":"healthy","unknown (disk)":"invalid type"}"#
        );
    }

    #[tokio::test]
    async fn test_all_healthy() {
        let (eval, _) = evaluator(
            Scripted::default()
                .answer("service:nginx", &[true])
                .answer("port:db:5432", &[true])
                .answer("ping:gw", &[true]),
        );
        let specs = vec![
            DependencySpec::service("nginx"),
            DependencySpec::port("db", 5432),
            DependencySpec::ping("gw"),
        ];

        let result = eval.evaluate(&specs).await;
        assert!(result.failures.is_empty());
        assert!(result.results.iter().all(|(_, s)| s == DependencyState::Healthy));
        assert_eq!(result.results.len(), 3);
    }

    #[tokio::test]
    async fn test_unhealthy_port_recorded_with_failure() {
        let (eval, _) = evaluator(Scripted::default().answer("port:db:5432", &[false]));
        let result = eval.evaluate(&[DependencySpec::port("db", 5432)]).await;
        assert_eq!(
            result.results.get("db:5432 (port)"),
            Some(DependencyState::Unhealthy)
        );
        assert_eq!(result.failures, vec!["db:5432 (port) check failed"]);
    }

    #[tokio::test]
    async fn test_unknown_type_never_probes() {
        let (eval, caps) = evaluator(Scripted::default());
        let result = eval.evaluate(&[unknown("disk")]).await;

        assert_eq!(
            result.results.get("unknown (disk)"),
            Some(DependencyState::InvalidType)
        );
        assert_eq!(result.failures, vec!["Unknown dependency type: disk"]);
        assert!(caps.calls().is_empty());
    }

    #[tokio::test]
    async fn test_auto_fix_success_records_fixed() {
        let (eval, caps) = evaluator(
            Scripted::default()
                .answer("service:nginx", &[false, false, true])
                .answer("start:nginx", &[true]),
        );
        let spec = DependencySpec::service("nginx")
            .with_retry(2, Duration::ZERO)
            .with_auto_fix(true);

        let result = eval.evaluate(&[spec]).await;
        assert_eq!(
            result.results.get("nginx (service)"),
            Some(DependencyState::Fixed)
        );
        assert!(result.failures.is_empty());
        assert_eq!(
            caps.calls(),
            vec!["service:nginx", "service:nginx", "start:nginx", "service:nginx"]
        );
    }

    #[tokio::test]
    async fn test_auto_fix_start_fails_records_unhealthy() {
        let (eval, caps) = evaluator(
            Scripted::default()
                .answer("service:nginx", &[false])
                .answer("start:nginx", &[false]),
        );
        let spec = DependencySpec::service("nginx").with_auto_fix(true);

        let result = eval.evaluate(&[spec]).await;
        assert_eq!(
            result.results.get("nginx (service)"),
            Some(DependencyState::Unhealthy)
        );
        assert_eq!(result.failures, vec!["nginx (service) check failed"]);
        // no re-probe after a failed start
        assert_eq!(caps.count("service:nginx"), 1);
    }

    #[tokio::test]
    async fn test_auto_fix_reprobe_still_down_records_unhealthy() {
        let (eval, caps) = evaluator(
            Scripted::default()
                .answer("service:nginx", &[false])
                .answer("start:nginx", &[true]),
        );
        let spec = DependencySpec::service("nginx")
            .with_retry(3, Duration::ZERO)
            .with_auto_fix(true);

        let result = eval.evaluate(&[spec]).await;
        assert_eq!(
            result.results.get("nginx (service)"),
            Some(DependencyState::Unhealthy)
        );
        assert_eq!(result.failures.len(), 1);
        // full retry budget before and after the start attempt
        assert_eq!(caps.count("service:nginx"), 6);
    }

    #[tokio::test]
    async fn test_no_auto_fix_never_starts_service() {
        let (eval, caps) = evaluator(Scripted::default().answer("service:nginx", &[false]));
        eval.evaluate(&[DependencySpec::service("nginx")]).await;
        assert_eq!(caps.count("start:nginx"), 0);
    }

    #[tokio::test]
    async fn test_healthy_service_with_auto_fix_not_started() {
        let (eval, caps) = evaluator(Scripted::default().answer("service:nginx", &[true]));
        let spec = DependencySpec::service("nginx").with_auto_fix(true);
        let result = eval.evaluate(&[spec]).await;
        assert_eq!(
            result.results.get("nginx (service)"),
            Some(DependencyState::Healthy)
        );
        assert_eq!(caps.count("start:nginx"), 0);
    }

    #[tokio::test]
    async fn test_retries_recover_transient_failure() {
        let (eval, caps) = evaluator(Scripted::default().answer("ping:gw", &[false, false, true]));
        let spec = DependencySpec::ping("gw").with_retry(3, Duration::ZERO);
        let result = eval.evaluate(&[spec]).await;
        assert!(result.failures.is_empty());
        assert_eq!(caps.count("ping:gw"), 3);
    }

    #[tokio::test]
    async fn test_batch_continues_after_failures() {
        let (eval, _) = evaluator(
            Scripted::default()
                .answer("ping:a", &[false])
                .answer("ping:c", &[true]),
        );
        let specs = vec![
            DependencySpec::ping("a"),
            unknown("disk"),
            DependencySpec::ping("c"),
        ];
        let result = eval.evaluate(&specs).await;
        assert_eq!(result.results.len(), 3);
        assert_eq!(
            result.failures,
            vec!["a (ping) check failed", "Unknown dependency type: disk"]
        );
        assert_eq!(result.results.get("c (ping)"), Some(DependencyState::Healthy));
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let script = || {
            Scripted::default()
                .answer("service:nginx", &[false])
                .answer("start:nginx", &[true])
                .answer("port:db:5432", &[true])
                .answer("ping:gw", &[false])
        };
        let specs = vec![
            DependencySpec::service("nginx").with_auto_fix(true),
            DependencySpec::port("db", 5432),
            unknown("disk"),
            DependencySpec::ping("gw"),
        ];

        let (sequential, _) = evaluator(script());
        let (parallel, _) = evaluator(script());
        let parallel = parallel.with_parallel(true);

        let a = sequential.evaluate(&specs).await;
        let b = parallel.evaluate(&specs).await;
        assert_eq!(a, b);
        let keys: Vec<&str> = b.results.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["nginx (service)", "db:5432 (port)", "unknown (disk)", "gw (ping)"]
        );
    }
}
