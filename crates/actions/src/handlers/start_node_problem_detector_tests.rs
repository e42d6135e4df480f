// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::test_context_single_root;

#[tokio::test]
async fn fresh_install_writes_config_unit_and_starts() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, fakes) = test_context_single_root(dir.path().to_path_buf());
    let handler = StartNodeProblemDetectorHandler;
    let status = handler
        .apply(&ctx, StartNodeProblemDetectorSpec { kubelet_log_path: String::new() })
        .await
        .unwrap();
    assert!(status.config_changed);
    assert!(status.unit_written);
    assert!(status.restarted);
    assert!(fakes.service_manager.is_active(UNIT_NAME));
    assert!(ctx.host_path(CONFIG_PATH).exists());
}

#[tokio::test]
async fn second_pass_is_idempotent_but_still_attempts_unit_write() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, fakes) = test_context_single_root(dir.path().to_path_buf());
    let handler = StartNodeProblemDetectorHandler;
    handler
        .apply(&ctx, StartNodeProblemDetectorSpec { kubelet_log_path: String::new() })
        .await
        .unwrap();
    let status = handler
        .apply(&ctx, StartNodeProblemDetectorSpec { kubelet_log_path: String::new() })
        .await
        .unwrap();
    assert!(!status.config_changed);
    assert!(!status.unit_written, "unit file already exists, write_unit_file must report no-op");
    assert!(!status.restarted);
    assert_eq!(fakes.service_manager.restart_count(UNIT_NAME), 0);
}

#[test]
fn validate_rejects_relative_log_path() {
    let spec = StartNodeProblemDetectorSpec { kubelet_log_path: "relative/path".to_string() };
    assert!(spec.validate().is_err());
}

#[test]
fn defaulting_fills_default_log_path() {
    let spec = StartNodeProblemDetectorSpec { kubelet_log_path: String::new() }.defaulting();
    assert_eq!(spec.kubelet_log_path, DEFAULT_KUBELET_LOG_PATH);
}
