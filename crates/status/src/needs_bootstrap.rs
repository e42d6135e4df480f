// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `needsBootstrap` — true when any critical predicate fails: kubelet not
//! running, kubelet not ready, kubelet version absent or mismatched, the
//! container runtime not running, or the status snapshot missing entirely
//! (design §4.5).

use nodeagent_core::{NodeStatus, ReadyState};

fn normalize(version: &str) -> Option<&str> {
    let trimmed = version.trim().trim_start_matches('v');
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") {
        None
    } else {
        Some(trimmed)
    }
}

/// Whether the host needs a full bootstrap run, given the last-collected
/// status snapshot (if any) and the currently desired kubelet version.
pub fn needs_bootstrap(status: Option<&NodeStatus>, desired_kubelet_version: &str) -> bool {
    let Some(status) = status else {
        return true;
    };

    if !status.kubelet_running {
        return true;
    }
    if status.kubelet_ready != ReadyState::Ready {
        return true;
    }
    if !status.container_runtime_running {
        return true;
    }

    match (normalize(&status.kubelet_version), normalize(desired_kubelet_version)) {
        (Some(current), Some(desired)) => current != desired,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeagent_core::test_support::node_status_fixture;
    use nodeagent_core::ReadyState;

    #[test]
    fn missing_status_needs_bootstrap() {
        assert!(needs_bootstrap(None, "1.30.7"));
    }

    #[test]
    fn healthy_matching_status_does_not_need_bootstrap() {
        let now = chrono::Utc::now();
        let status = node_status_fixture("v1.30.7", now);
        assert!(!needs_bootstrap(Some(&status), "1.30.7"));
    }

    #[test]
    fn kubelet_not_running_needs_bootstrap() {
        let now = chrono::Utc::now();
        let mut status = node_status_fixture("1.30.7", now);
        status.kubelet_running = false;
        assert!(needs_bootstrap(Some(&status), "1.30.7"));
    }

    #[test]
    fn kubelet_not_ready_needs_bootstrap() {
        let now = chrono::Utc::now();
        let mut status = node_status_fixture("1.30.7", now);
        status.kubelet_ready = ReadyState::NotReady;
        assert!(needs_bootstrap(Some(&status), "1.30.7"));
    }

    #[test]
    fn version_mismatch_needs_bootstrap() {
        let now = chrono::Utc::now();
        let status = node_status_fixture("1.29.4", now);
        assert!(needs_bootstrap(Some(&status), "1.30.7"));
    }

    #[test]
    fn unknown_version_needs_bootstrap() {
        let now = chrono::Utc::now();
        let status = node_status_fixture("unknown", now);
        assert!(needs_bootstrap(Some(&status), "1.30.7"));
    }

    #[test]
    fn container_runtime_not_running_needs_bootstrap() {
        let now = chrono::Utc::now();
        let mut status = node_status_fixture("1.30.7", now);
        status.container_runtime_running = false;
        assert!(needs_bootstrap(Some(&status), "1.30.7"));
    }
}
