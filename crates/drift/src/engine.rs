// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`DriftEngine`] — the orchestration in design §4.6: load both snapshots,
//! run every detector, resolve one plan, dispatch it under the mutex gate.

use crate::detector::Detector;
use crate::finding::RemediationAction;
use crate::plan::resolve_plan;
use nodeagent_core::{Clock, ManagedClusterSpec, MutexGate, NodeAgentError};
use nodeagent_executor::executor::{BootstrapExecutor, FailurePolicy};
use nodeagent_executor::plan::{upgrade_remediation, KubeletParams, KubernetesUpgradeParams};
use nodeagent_executor::result::ExecutionResult;
use nodeagent_storage::SnapshotStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// What one `run_tick` call actually did, for callers (the health loop,
/// integration tests) that care which branch of §4.6 step 1-5 was taken.
#[derive(Debug)]
pub enum DriftOutcome {
    /// Either snapshot was absent.
    SnapshotMissing,
    /// The spec snapshot exists but is older than the configured max age.
    SpecStale,
    /// Every detector ran and none requested remediation.
    NoRemediationNeeded,
    /// Remediation was requested but the mutex gate was already held.
    Skipped,
    /// Remediation ran; carries the executor's result.
    Remediated(ExecutionResult),
}

/// Orchestrates one drift-detection tick (design §4.6): load both
/// snapshots, run every registered [`Detector`], resolve their findings
/// into at most one [`crate::plan::RemediationPlan`], and dispatch it
/// through the shared [`BootstrapExecutor`] under the process-wide
/// [`MutexGate`].
pub struct DriftEngine<C: Clock> {
    store: SnapshotStore,
    status_path: PathBuf,
    spec_path: PathBuf,
    executor: BootstrapExecutor,
    detectors: Vec<Arc<dyn Detector>>,
    pub gate: MutexGate,
    max_spec_age: chrono::Duration,
    agent_version: String,
    kubelet_params: KubeletParams,
    clock: C,
}

impl<C: Clock> DriftEngine<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: SnapshotStore,
        status_path: PathBuf,
        spec_path: PathBuf,
        executor: BootstrapExecutor,
        detectors: Vec<Arc<dyn Detector>>,
        gate: MutexGate,
        max_spec_age: chrono::Duration,
        agent_version: impl Into<String>,
        kubelet_params: KubeletParams,
        clock: C,
    ) -> Self {
        Self {
            store,
            status_path,
            spec_path,
            executor,
            detectors,
            gate,
            max_spec_age,
            agent_version: agent_version.into(),
            kubelet_params,
            clock,
        }
    }

    pub async fn run_tick(&self) -> Result<DriftOutcome, NodeAgentError> {
        let status = self.store.load_status(&self.status_path)?;
        let spec = self.store.load_spec(&self.spec_path)?;
        let (Some(status), Some(spec)) = (status, spec) else {
            info!("drift engine: status or spec snapshot absent, skipping tick");
            return Ok(DriftOutcome::SnapshotMissing);
        };

        if !self.spec_is_fresh(&spec) {
            info!(collected_at = %spec.collected_at, "drift engine: spec snapshot stale, skipping tick");
            return Ok(DriftOutcome::SpecStale);
        }

        let mut findings = Vec::new();
        for detector in &self.detectors {
            match detector.detect(&spec, &status).await {
                Ok(mut found) => findings.append(&mut found),
                Err(e) => warn!(detector = detector.name(), error = %e, "drift engine: detector failed, continuing"),
            }
        }

        let Some(plan) = resolve_plan(&findings)? else {
            return Ok(DriftOutcome::NoRemediationNeeded);
        };

        let Some(guard) = self.gate.try_acquire() else {
            info!("drift engine: mutex gate already held, skipping remediation this tick");
            return Ok(DriftOutcome::Skipped);
        };

        let result = match plan.action {
            RemediationAction::Unspecified => unreachable!("resolve_plan never returns an Unspecified plan"),
            RemediationAction::KubernetesUpgrade => {
                let kubernetes_version = plan.kubernetes_version.unwrap_or_default();
                let steps = upgrade_remediation(&KubernetesUpgradeParams {
                    kubernetes_version,
                    kubelet: self.kubelet_params.clone(),
                });
                self.executor.run(steps, FailurePolicy::AbortOnFirstFailure).await
            }
        };
        drop(guard);

        if !result.success {
            warn!(error = ?result.error, "drift engine: remediation failed, marking kubelet unhealthy");
            self.store.mark_kubelet_unhealthy(&self.status_path, self.clock.now(), &self.agent_version);
            return Err(NodeAgentError::Internal(
                result.error.clone().unwrap_or_else(|| "remediation failed".to_string()),
            ));
        }

        Ok(DriftOutcome::Remediated(result))
    }

    fn spec_is_fresh(&self, spec: &ManagedClusterSpec) -> bool {
        if spec.collected_at.timestamp() == 0 {
            return false;
        }
        self.clock.now() - spec.collected_at < self.max_spec_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::KubernetesVersionDetector;
    use chrono::Utc;
    use nodeagent_actions::auth::{BootstrapTokenAuth, KubeletAuthVariants};
    use nodeagent_actions::test_support::test_context_single_root;
    use nodeagent_bus::Dispatcher;
    use nodeagent_core::test_support::{cluster_spec_fixture, node_status_fixture};
    use nodeagent_core::FakeClock;

    fn kubelet_params() -> KubeletParams {
        KubeletParams {
            server: "https://10.0.0.1:6443".to_string(),
            ca_pem: "-----BEGIN CERTIFICATE-----\nabc\n-----END CERTIFICATE-----".to_string(),
            node_ip: "10.0.0.5".to_string(),
            extra_args: vec![],
            auth: KubeletAuthVariants {
                bootstrap_token: Some(BootstrapTokenAuth { token: "abcdef.0123456789abcdef".to_string() }),
                ..Default::default()
            },
        }
    }

    fn engine_with(
        dir: &std::path::Path,
        clock: FakeClock,
    ) -> (DriftEngine<FakeClock>, PathBuf, PathBuf, SnapshotStore) {
        let (ctx, _fakes) = test_context_single_root(dir.to_path_buf());
        let dispatcher = Dispatcher::new(nodeagent_bus::registry::build().unwrap(), ctx);
        let executor = BootstrapExecutor::new(dispatcher);
        let store = SnapshotStore::new();
        let status_path = dir.join("status.json");
        let spec_path = dir.join("managedcluster-spec.json");

        let engine = DriftEngine::new(
            store.clone(),
            status_path.clone(),
            spec_path.clone(),
            executor,
            vec![Arc::new(KubernetesVersionDetector) as Arc<dyn Detector>],
            MutexGate::new(),
            chrono::Duration::hours(2),
            "0.2.0",
            kubelet_params(),
            clock,
        );
        (engine, status_path, spec_path, store)
    }

    #[tokio::test]
    async fn missing_snapshots_skip_the_tick() {
        let dir = tempfile::tempdir().unwrap();
        let clock = FakeClock::new(Utc::now());
        let (engine, _status, _spec, _store) = engine_with(dir.path(), clock);
        let outcome = engine.run_tick().await.unwrap();
        assert!(matches!(outcome, DriftOutcome::SnapshotMissing));
    }

    #[tokio::test]
    async fn stale_spec_skips_the_tick() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        let clock = FakeClock::new(now);
        let (engine, status_path, spec_path, store) = engine_with(dir.path(), clock.clone());

        store.write_status(&status_path, &node_status_fixture("1.29.8", now)).unwrap();
        let stale_spec = cluster_spec_fixture("1.30.7", now - chrono::Duration::hours(2) - chrono::Duration::minutes(1));
        store.write_spec(&spec_path, &stale_spec).unwrap();

        let outcome = engine.run_tick().await.unwrap();
        assert!(matches!(outcome, DriftOutcome::SpecStale));
    }

    #[tokio::test]
    async fn no_drift_needs_no_remediation() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        let clock = FakeClock::new(now);
        let (engine, status_path, spec_path, store) = engine_with(dir.path(), clock);

        store.write_status(&status_path, &node_status_fixture("1.30.7", now)).unwrap();
        store.write_spec(&spec_path, &cluster_spec_fixture("1.30.7", now)).unwrap();

        let outcome = engine.run_tick().await.unwrap();
        assert!(matches!(outcome, DriftOutcome::NoRemediationNeeded));
    }

    #[tokio::test]
    async fn minor_version_drift_runs_the_four_step_remediation() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        let clock = FakeClock::new(now);
        let (engine, status_path, spec_path, store) = engine_with(dir.path(), clock);

        store.write_status(&status_path, &node_status_fixture("1.29.8", now)).unwrap();
        store.write_spec(&spec_path, &cluster_spec_fixture("1.30.7", now)).unwrap();

        let outcome = engine.run_tick().await.unwrap();
        match outcome {
            DriftOutcome::Remediated(result) => {
                assert!(result.success, "remediation failed: {:?}", result.error);
                assert_eq!(result.step_count, 4);
            }
            other => panic!("expected Remediated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn held_gate_skips_remediation() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        let clock = FakeClock::new(now);
        let (engine, status_path, spec_path, store) = engine_with(dir.path(), clock);

        store.write_status(&status_path, &node_status_fixture("1.29.8", now)).unwrap();
        store.write_spec(&spec_path, &cluster_spec_fixture("1.30.7", now)).unwrap();

        let _guard = engine.gate.try_acquire().unwrap();
        let outcome = engine.run_tick().await.unwrap();
        assert!(matches!(outcome, DriftOutcome::Skipped));
    }
}
