// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`StatusCollector`] — probes installed binary versions, service
//! active-states, and the kubelet `Ready` condition into one
//! [`NodeStatus`] snapshot.

use nodeagent_adapters::process::ProcessRunner;
use nodeagent_adapters::ready_probe::ReadyProbe;
use nodeagent_adapters::service_manager::{ServiceManager, UnitState};
use nodeagent_core::{Clock, LastUpdated, NodeStatus, StatusReason, StatusSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const KUBELET_UNIT: &str = "kubelet.service";
const CONTAINERD_UNIT: &str = "containerd.service";
const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Gathers current host facts into a [`NodeStatus`] snapshot (design §4.5).
/// Every probe is best-effort: a missing binary or an unreachable service
/// manager degrades to `false`/`"unknown"` rather than failing the whole
/// collection.
pub struct StatusCollector<C: Clock> {
    service_manager: Arc<dyn ServiceManager>,
    process_runner: Arc<dyn ProcessRunner>,
    ready_probe: Arc<dyn ReadyProbe>,
    clock: C,
    agent_version: String,
}

impl<C: Clock> StatusCollector<C> {
    pub fn new(
        service_manager: Arc<dyn ServiceManager>,
        process_runner: Arc<dyn ProcessRunner>,
        ready_probe: Arc<dyn ReadyProbe>,
        clock: C,
        agent_version: impl Into<String>,
    ) -> Self {
        Self { service_manager, process_runner, ready_probe, clock, agent_version: agent_version.into() }
    }

    pub async fn collect(&self) -> NodeStatus {
        let kubelet_running = matches!(self.service_manager.unit_state(KUBELET_UNIT).await, Ok(UnitState::Active));
        let container_runtime_running =
            matches!(self.service_manager.unit_state(CONTAINERD_UNIT).await, Ok(UnitState::Active));
        let kubelet_ready = self.ready_probe.kubelet_ready().await;
        let kubelet_version = self.probe_version("kubelet").await;
        let container_runtime_version = self.probe_version("containerd").await;
        let runc_version = self.probe_version("runc").await;
        let now = self.clock.now();

        info!(
            kubelet_running,
            container_runtime_running,
            kubelet_version = %kubelet_version,
            "status collector: collected host facts"
        );

        NodeStatus {
            kubelet_running,
            kubelet_ready,
            kubelet_version,
            container_runtime_running,
            container_runtime_version,
            runc_version,
            last_updated: LastUpdated {
                timestamp: now,
                source: StatusSource::StatusCollectionLoop,
                reason: StatusReason::PeriodicStatusLoop,
            },
            agent_version: self.agent_version.clone(),
            registration: None,
        }
    }

    /// Run `<binary> --version` and extract the first dotted-numeric token
    /// from its output. A spawn failure or unparsable output degrades to
    /// `"unknown"` rather than erroring the whole collection.
    async fn probe_version(&self, binary: &str) -> String {
        match self.process_runner.run(binary, &["--version"], VERSION_PROBE_TIMEOUT).await {
            Ok(output) if output.success => match extract_version_token(&output.stdout) {
                Some(version) => version,
                None => "unknown".to_string(),
            },
            _ => "unknown".to_string(),
        }
    }
}

/// Finds the first whitespace-separated token that looks like a version
/// (an optional leading `v`, starting with a digit, containing a `.`),
/// e.g. pulls `v1.30.7` out of `"Kubernetes v1.30.7"` or `1.1.13` out of
/// `"runc version 1.1.13"`.
fn extract_version_token(stdout: &str) -> Option<String> {
    stdout.split_whitespace().find_map(|token| {
        let trimmed = token.trim_end_matches(',').trim_start_matches('v');
        let looks_like_version =
            trimmed.chars().next().is_some_and(|c| c.is_ascii_digit()) && trimmed.contains('.');
        looks_like_version.then(|| token.trim_end_matches(',').to_string())
    })
}
