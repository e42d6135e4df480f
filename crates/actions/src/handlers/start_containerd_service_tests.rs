// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::test_context_single_root;

#[tokio::test]
async fn fresh_install_writes_unit_and_starts() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, fakes) = test_context_single_root(dir.path().to_path_buf());
    let handler = StartContainerdServiceHandler;
    let status = handler
        .apply(&ctx, StartContainerdServiceSpec { sandbox_image: String::new(), runtime_root: String::new(), gpu_runtime: false })
        .await
        .unwrap();
    assert!(status.config_changed);
    assert!(status.restarted);
    assert!(fakes.service_manager.is_active(UNIT_NAME));
    assert_eq!(fakes.service_manager.reload_count(), 1);
}

#[tokio::test]
async fn second_pass_is_idempotent_no_restart() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, fakes) = test_context_single_root(dir.path().to_path_buf());
    let handler = StartContainerdServiceHandler;
    let spec = StartContainerdServiceSpec { sandbox_image: String::new(), runtime_root: String::new(), gpu_runtime: false };
    handler.apply(&ctx, spec.clone()).await.unwrap();
    let status = handler.apply(&ctx, spec).await.unwrap();
    assert!(!status.config_changed);
    assert!(!status.restarted);
    assert_eq!(fakes.service_manager.restart_count(UNIT_NAME), 0);
}

#[tokio::test]
async fn gpu_drop_in_triggers_restart_when_added() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, _fakes) = test_context_single_root(dir.path().to_path_buf());
    let handler = StartContainerdServiceHandler;
    handler
        .apply(&ctx, StartContainerdServiceSpec { sandbox_image: String::new(), runtime_root: String::new(), gpu_runtime: false })
        .await
        .unwrap();
    let status = handler
        .apply(&ctx, StartContainerdServiceSpec { sandbox_image: String::new(), runtime_root: String::new(), gpu_runtime: true })
        .await
        .unwrap();
    assert!(status.gpu_drop_in_written);
    assert!(status.restarted);
}

#[test]
fn validate_rejects_relative_runtime_root() {
    let spec = StartContainerdServiceSpec { sandbox_image: String::new(), runtime_root: "var/lib/containerd".to_string(), gpu_runtime: false };
    assert!(spec.validate().is_err());
}
