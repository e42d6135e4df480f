// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two on-disk snapshot documents (design §3): node-status and
//! managed-cluster-spec. Both are plain serde-derived value types; the
//! atomic write/read discipline lives in `nodeagent-storage`, which treats
//! these as opaque payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version written into every managed-cluster-spec document.
pub const MANAGED_CLUSTER_SPEC_SCHEMA_VERSION: u32 = 1;

/// Which loop produced the last status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusSource {
    StatusCollectionLoop,
    DriftDetectionAndRemediation,
}

/// Why the last status update happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusReason {
    PeriodicStatusLoop,
    KubernetesVersionDrift,
}

/// The kubelet `Ready` condition, probed externally (design §4.5) and
/// treated as a black-box tri-state result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadyState {
    Ready,
    NotReady,
    Unknown,
}

/// Timestamp plus provenance for the last status write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastUpdated {
    pub timestamp: DateTime<Utc>,
    pub source: StatusSource,
    pub reason: StatusReason,
}

/// Best-effort registration-side status, populated by the external
/// Arc-style registration collaborator (out of scope for this crate; see
/// design §1). Absent on a host that hasn't registered yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatus {
    pub registered: bool,
    pub instance_id: Option<String>,
}

/// The node-status snapshot (design §3): kubelet running/ready/version,
/// container-runtime running/version, runc version, last-updated
/// timestamp, agent version, optional registration-side status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    pub kubelet_running: bool,
    pub kubelet_ready: ReadyState,
    pub kubelet_version: String,
    pub container_runtime_running: bool,
    pub container_runtime_version: String,
    pub runc_version: String,
    pub last_updated: LastUpdated,
    pub agent_version: String,
    #[serde(default)]
    pub registration: Option<RegistrationStatus>,
}

impl NodeStatus {
    /// A document representing "nothing collected yet", used as the base
    /// for `markKubeletUnhealthy` when no prior status exists.
    pub fn empty(now: DateTime<Utc>, agent_version: &str) -> Self {
        Self {
            kubelet_running: false,
            kubelet_ready: ReadyState::Unknown,
            kubelet_version: "unknown".to_string(),
            container_runtime_running: false,
            container_runtime_version: "unknown".to_string(),
            runc_version: "unknown".to_string(),
            last_updated: LastUpdated {
                timestamp: now,
                source: StatusSource::StatusCollectionLoop,
                reason: StatusReason::PeriodicStatusLoop,
            },
            agent_version: agent_version.to_string(),
            registration: None,
        }
    }

    /// Forces the kubelet fields unhealthy and stamps the update as having
    /// come from drift remediation (design §4.4): ensures the next health
    /// tick observes an unhealthy node even if remediation failed mid-way.
    pub fn mark_kubelet_unhealthy(&mut self, now: DateTime<Utc>) {
        self.kubelet_running = false;
        self.kubelet_ready = ReadyState::Unknown;
        self.kubelet_version = "unknown".to_string();
        self.last_updated = LastUpdated {
            timestamp: now,
            source: StatusSource::DriftDetectionAndRemediation,
            reason: StatusReason::KubernetesVersionDrift,
        };
    }
}

/// The managed-cluster-spec snapshot (design §3): desired Kubernetes
/// version (a coarse field and a precise field, precise wins), collection
/// timestamp, schema version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterSpec {
    pub schema_version: u32,
    #[serde(default)]
    pub kubernetes_version: String,
    #[serde(default)]
    pub current_kubernetes_version: String,
    pub collected_at: DateTime<Utc>,
}

impl ManagedClusterSpec {
    /// The desired Kubernetes version: `currentKubernetesVersion` wins when
    /// present, falling back to the coarser `kubernetesVersion` field.
    pub fn desired_kubernetes_version(&self) -> &str {
        if !self.current_kubernetes_version.trim().is_empty() {
            &self.current_kubernetes_version
        } else {
            &self.kubernetes_version
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precise_version_wins_over_coarse() {
        let spec = ManagedClusterSpec {
            schema_version: 1,
            kubernetes_version: "1.29".to_string(),
            current_kubernetes_version: "1.30.7".to_string(),
            collected_at: Utc::now(),
        };
        assert_eq!(spec.desired_kubernetes_version(), "1.30.7");
    }

    #[test]
    fn falls_back_to_coarse_when_precise_empty() {
        let spec = ManagedClusterSpec {
            schema_version: 1,
            kubernetes_version: "1.29".to_string(),
            current_kubernetes_version: String::new(),
            collected_at: Utc::now(),
        };
        assert_eq!(spec.desired_kubernetes_version(), "1.29");
    }

    #[test]
    fn mark_kubelet_unhealthy_sets_expected_fields() {
        let now = Utc::now();
        let mut status = NodeStatus::empty(now, "0.2.0");
        status.kubelet_running = true;
        status.kubelet_version = "1.30.7".to_string();
        let later = now + chrono::Duration::minutes(5);
        status.mark_kubelet_unhealthy(later);
        assert!(!status.kubelet_running);
        assert_eq!(status.kubelet_ready, ReadyState::Unknown);
        assert_eq!(status.kubelet_version, "unknown");
        assert_eq!(status.last_updated.source, StatusSource::DriftDetectionAndRemediation);
        assert_eq!(status.last_updated.reason, StatusReason::KubernetesVersionDrift);
    }
}
