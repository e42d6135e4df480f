// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for the snapshot documents.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]` so downstream
//! crates (`nodeagent-storage`, `nodeagent-status`, `nodeagent-drift`) can
//! build fixtures without duplicating field lists.

use crate::snapshot::{
    LastUpdated, ManagedClusterSpec, NodeStatus, ReadyState, StatusReason, StatusSource,
    MANAGED_CLUSTER_SPEC_SCHEMA_VERSION,
};
use chrono::{DateTime, Utc};

/// A healthy node-status fixture at the given kubelet version.
pub fn node_status_fixture(kubelet_version: &str, now: DateTime<Utc>) -> NodeStatus {
    NodeStatus {
        kubelet_running: true,
        kubelet_ready: ReadyState::Ready,
        kubelet_version: kubelet_version.to_string(),
        container_runtime_running: true,
        container_runtime_version: "1.7.22".to_string(),
        runc_version: "1.1.14".to_string(),
        last_updated: LastUpdated {
            timestamp: now,
            source: StatusSource::StatusCollectionLoop,
            reason: StatusReason::PeriodicStatusLoop,
        },
        agent_version: "0.2.0".to_string(),
        registration: None,
    }
}

/// A managed-cluster-spec fixture with a precise desired version, collected
/// at the given instant.
pub fn cluster_spec_fixture(current_kubernetes_version: &str, collected_at: DateTime<Utc>) -> ManagedClusterSpec {
    ManagedClusterSpec {
        schema_version: MANAGED_CLUSTER_SPEC_SCHEMA_VERSION,
        kubernetes_version: String::new(),
        current_kubernetes_version: current_kubernetes_version.to_string(),
        collected_at,
    }
}
