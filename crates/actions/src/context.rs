// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared context every action handler reads from: the adapter trait
//! objects (wired to real backends in the daemon, fakes in tests), the
//! host-root paths every handler writes under, and the cancellation token
//! propagated from the daemon supervisor so a long-running handler (kubeadm
//! join's poll loop) can abort mid-step.

use nodeagent_adapters::{CredentialExecPlugin, Downloader, ProcessRunner, ReadyProbe, ServiceManager};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct ActionContext {
    pub service_manager: Arc<dyn ServiceManager>,
    pub downloader: Arc<dyn Downloader>,
    pub process_runner: Arc<dyn ProcessRunner>,
    pub ready_probe: Arc<dyn ReadyProbe>,
    pub credential_exec: Arc<dyn CredentialExecPlugin>,
    pub bin_root: PathBuf,
    pub cni_bin_root: PathBuf,
    pub etc_root: PathBuf,
    pub download_max_bytes: u64,
    pub kubelet_join_timeout: Duration,
    pub kubelet_join_poll_interval: Duration,
    pub cancellation: CancellationToken,
}

impl ActionContext {
    /// Resolves an absolute host path (e.g. `/etc/kubernetes/pki/ca.pem`)
    /// under `etc_root`, so every handler can run against a scratch
    /// directory in tests and the real filesystem root in production.
    pub fn host_path(&self, path: &str) -> PathBuf {
        self.etc_root.join(strip_root(Path::new(path)))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn systemd_unit_dir(&self) -> PathBuf {
        self.host_path("/etc/systemd/system")
    }
}

pub fn strip_root(path: &Path) -> &Path {
    path.strip_prefix("/").unwrap_or(path)
}
