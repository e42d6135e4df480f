// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pluggable `Detector` trait (design §4.6) plus the one detector this
//! spec ships: `KubernetesVersionDetector`, comparing the managed-cluster
//! spec's desired version against the kubelet version observed in the
//! node-status snapshot.

use crate::finding::{Finding, Remediation};
use async_trait::async_trait;
use nodeagent_core::version::parse_major_minor;
use nodeagent_core::{ManagedClusterSpec, NodeAgentError, NodeStatus};

#[async_trait]
pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;

    async fn detect(
        &self,
        spec: &ManagedClusterSpec,
        status: &NodeStatus,
    ) -> Result<Vec<Finding>, NodeAgentError>;
}

fn normalized(version: &str) -> Option<&str> {
    let trimmed = version.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") {
        None
    } else {
        Some(trimmed)
    }
}

/// Compares `(major, minor)` only (design §4.6): a patch-level difference
/// never registers as drift, an unparsable version on either side never
/// auto-remediates, and current ≥ desired never downgrades.
pub struct KubernetesVersionDetector;

#[async_trait]
impl Detector for KubernetesVersionDetector {
    fn name(&self) -> &'static str {
        "kubernetes-version"
    }

    async fn detect(
        &self,
        spec: &ManagedClusterSpec,
        status: &NodeStatus,
    ) -> Result<Vec<Finding>, NodeAgentError> {
        let Some(desired_raw) = normalized(spec.desired_kubernetes_version()) else {
            return Ok(Vec::new());
        };
        let Some(current_raw) = normalized(&status.kubelet_version) else {
            return Ok(Vec::new());
        };

        let (Some(desired), Some(current)) = (parse_major_minor(desired_raw), parse_major_minor(current_raw))
        else {
            // Parse failure on either side: never auto-remediate ambiguity.
            return Ok(Vec::new());
        };

        if current >= desired {
            return Ok(Vec::new());
        }

        Ok(vec![Finding {
            id: "kubernetes-version".to_string(),
            title: "Kubernetes minor-version drift detected".to_string(),
            details: format!("kubelet is at {current_raw} but the managed cluster spec wants {desired_raw}"),
            remediation: Remediation::kubernetes_upgrade(desired_raw),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nodeagent_core::test_support::{cluster_spec_fixture, node_status_fixture};

    #[tokio::test]
    async fn emits_a_finding_when_current_is_behind() {
        let now = Utc::now();
        let spec = cluster_spec_fixture("1.30.7", now);
        let status = node_status_fixture("1.29.8", now);
        let findings = KubernetesVersionDetector.detect(&spec, &status).await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].remediation.kubernetes_version.as_deref(), Some("1.30.7"));
    }

    #[tokio::test]
    async fn never_requests_a_downgrade() {
        let now = Utc::now();
        let spec = cluster_spec_fixture("1.29.5", now);
        let status = node_status_fixture("1.30.1", now);
        let findings = KubernetesVersionDetector.detect(&spec, &status).await.unwrap();
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn equal_versions_produce_no_finding() {
        let now = Utc::now();
        let spec = cluster_spec_fixture("1.30.7", now);
        let status = node_status_fixture("v1.30.7", now);
        let findings = KubernetesVersionDetector.detect(&spec, &status).await.unwrap();
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn unparsable_current_version_produces_no_finding() {
        let now = Utc::now();
        let spec = cluster_spec_fixture("1.30.7", now);
        let status = node_status_fixture("unknown", now);
        let findings = KubernetesVersionDetector.detect(&spec, &status).await.unwrap();
        assert!(findings.is_empty());
    }
}
