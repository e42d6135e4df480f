// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DownloadKubeBinaries` — `kubelet`, `kubectl`, `kubeadm`, `kube-proxy`
//! present at the requested version (design §4.2). Unlike the CRI/CNI
//! probe (substring match on `--version` output), kube binaries are
//! checked for an exact dotted-version match since `kubeadm version`'s
//! short output is unambiguous.

use crate::context::ActionContext;
use crate::file_install::{ensure_file, is_executable};
use crate::handler::ActionHandler;
use crate::{Defaulting, Validate};
use async_trait::async_trait;
use nodeagent_core::version::parse_major_minor;
use nodeagent_core::{NodeAgentError, Redact, TypeUrl};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_KUBERNETES_VERSION: &str = "1.30.7";

pub const REQUIRED_BINARIES: &[&str] = &["kubelet", "kubectl", "kubeadm", "kube-proxy"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadKubeBinariesSpec {
    #[serde(default)]
    pub kubernetes_version: String,
}

impl Defaulting for DownloadKubeBinariesSpec {
    fn defaulting(mut self) -> Self {
        if self.kubernetes_version.trim().is_empty() {
            self.kubernetes_version = DEFAULT_KUBERNETES_VERSION.to_string();
        }
        self
    }
}

impl Validate for DownloadKubeBinariesSpec {
    fn validate(&self) -> Result<(), NodeAgentError> {
        if parse_major_minor(&self.kubernetes_version).is_none() {
            return Err(NodeAgentError::InvalidArgument(format!(
                "unparsable kubernetesVersion: {}",
                self.kubernetes_version
            )));
        }
        Ok(())
    }
}

impl Redact for DownloadKubeBinariesSpec {
    fn redact(&mut self) {}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadKubeBinariesStatus {
    pub kubernetes_version: String,
    pub binaries_installed: Vec<String>,
}

pub struct DownloadKubeBinariesHandler;

fn binary_url(binary: &str, version: &str) -> String {
    format!("https://dl.k8s.io/release/v{version}/bin/linux/amd64/{binary}")
}

/// Parsed-version equality: strips a leading `v`, compares the full
/// dotted version string exactly (unlike the CRI/CNI "contains" probe).
fn version_matches_exactly(stdout: &str, expected: &str) -> bool {
    let normalize = |s: &str| s.trim().trim_start_matches('v').to_string();
    stdout
        .split_whitespace()
        .map(normalize)
        .any(|token| token == normalize(expected))
}

#[async_trait]
impl ActionHandler for DownloadKubeBinariesHandler {
    type Spec = DownloadKubeBinariesSpec;
    type Status = DownloadKubeBinariesStatus;

    fn type_url() -> TypeUrl {
        TypeUrl::new("nodeagent.v1.DownloadKubeBinaries")
    }

    async fn apply(&self, ctx: &ActionContext, spec: Self::Spec) -> Result<Self::Status, NodeAgentError> {
        let spec = spec.defaulting();
        spec.validate()?;

        let mut installed = Vec::new();
        for binary in REQUIRED_BINARIES {
            let path = ctx.bin_root.join(binary);
            let current = if is_executable(&path) {
                match ctx
                    .process_runner
                    .run(path.to_string_lossy().as_ref(), &["version", "--client", "--output=short"], Duration::from_secs(10))
                    .await
                {
                    Ok(output) => output.success && version_matches_exactly(&output.stdout, &spec.kubernetes_version),
                    Err(_) => false,
                }
            } else {
                false
            };

            if !current {
                let bytes = ctx
                    .downloader
                    .download(&binary_url(binary, &spec.kubernetes_version), ctx.download_max_bytes)
                    .await
                    .map_err(NodeAgentError::from)?;
                ensure_file(&path, &bytes, 0o755)?;
            }
            installed.push((*binary).to_string());
        }

        Ok(DownloadKubeBinariesStatus { kubernetes_version: spec.kubernetes_version, binaries_installed: installed })
    }
}

#[cfg(test)]
#[path = "download_kube_binaries_tests.rs"]
mod tests;
