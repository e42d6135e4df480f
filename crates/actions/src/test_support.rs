// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared handler-test fixtures: an `ActionContext` wired entirely to
//! fakes, plus handles back to those fakes for assertions.

use crate::context::ActionContext;
use nodeagent_adapters::fakes::{FakeDownloader, FakeProcessRunner, FakeReadyProbe, FakeServiceManager};
use nodeagent_adapters::credential_exec::SelfExecPlugin;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct TestFakes {
    pub service_manager: FakeServiceManager,
    pub downloader: FakeDownloader,
    pub process_runner: FakeProcessRunner,
    pub ready_probe: FakeReadyProbe,
}

pub fn test_context(etc_root: PathBuf, bin_root: PathBuf, cni_bin_root: PathBuf) -> (ActionContext, TestFakes) {
    let service_manager = FakeServiceManager::new();
    let downloader = FakeDownloader::new();
    let process_runner = FakeProcessRunner::new();
    let ready_probe = FakeReadyProbe::default();

    let ctx = ActionContext {
        service_manager: Arc::new(service_manager.clone()),
        downloader: Arc::new(downloader.clone()),
        process_runner: Arc::new(process_runner.clone()),
        ready_probe: Arc::new(ready_probe.clone()),
        credential_exec: Arc::new(SelfExecPlugin::new("/usr/local/bin/nodeagent")),
        bin_root,
        cni_bin_root,
        etc_root,
        download_max_bytes: 1024 * 1024 * 1024,
        kubelet_join_timeout: std::time::Duration::from_millis(200),
        kubelet_join_poll_interval: std::time::Duration::from_millis(20),
        cancellation: CancellationToken::new(),
    };

    (ctx, TestFakes { service_manager, downloader, process_runner, ready_probe })
}

/// Convenience constructor for tests that only need one scratch directory
/// shared across `etc_root`/`bin_root`/`cni_bin_root`.
pub fn test_context_single_root(root: PathBuf) -> (ActionContext, TestFakes) {
    test_context(root.clone(), root.join("usr/local/bin"), root.join("opt/cni/bin"))
}
