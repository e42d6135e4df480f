// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DownloadCRIBinaries` — `containerd*`, `runc` installed at the requested
//! versions (design §4.2). `containerd` ships as a gzip-wrapped tarball;
//! `runc` ships as a bare executable, so the two take different install
//! paths through `extract_tar_gz` vs. `ensure_file`.

use crate::context::ActionContext;
use crate::file_install::is_executable;
use crate::handler::ActionHandler;
use crate::{Defaulting, Validate};
use async_trait::async_trait;
use nodeagent_adapters::{extract_tar_gz, probe_version_contains};
use nodeagent_core::version::parse_major_minor;
use nodeagent_core::{NodeAgentError, Redact, TypeUrl};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTAINERD_VERSION: &str = "1.7.20";
pub const DEFAULT_RUNC_VERSION: &str = "1.1.13";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadCriBinariesSpec {
    #[serde(default)]
    pub containerd_version: String,
    #[serde(default)]
    pub runc_version: String,
}

impl Defaulting for DownloadCriBinariesSpec {
    fn defaulting(mut self) -> Self {
        if self.containerd_version.trim().is_empty() {
            self.containerd_version = DEFAULT_CONTAINERD_VERSION.to_string();
        }
        if self.runc_version.trim().is_empty() {
            self.runc_version = DEFAULT_RUNC_VERSION.to_string();
        }
        self
    }
}

impl Validate for DownloadCriBinariesSpec {
    fn validate(&self) -> Result<(), NodeAgentError> {
        if parse_major_minor(&self.containerd_version).is_none() {
            return Err(NodeAgentError::InvalidArgument(format!(
                "unparsable containerdVersion: {}",
                self.containerd_version
            )));
        }
        if parse_major_minor(&self.runc_version).is_none() {
            return Err(NodeAgentError::InvalidArgument(format!("unparsable runcVersion: {}", self.runc_version)));
        }
        Ok(())
    }
}

impl Redact for DownloadCriBinariesSpec {
    fn redact(&mut self) {}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadCriBinariesStatus {
    pub containerd_version: String,
    pub runc_version: String,
}

pub struct DownloadCriBinariesHandler;

fn containerd_archive_url(version: &str) -> String {
    format!("https://github.com/containerd/containerd/releases/download/v{version}/containerd-{version}-linux-amd64.tar.gz")
}

fn runc_url(version: &str) -> String {
    format!("https://github.com/opencontainers/runc/releases/download/v{version}/runc.amd64")
}

#[async_trait]
impl ActionHandler for DownloadCriBinariesHandler {
    type Spec = DownloadCriBinariesSpec;
    type Status = DownloadCriBinariesStatus;

    fn type_url() -> TypeUrl {
        TypeUrl::new("nodeagent.v1.DownloadCRIBinaries")
    }

    async fn apply(&self, ctx: &ActionContext, spec: Self::Spec) -> Result<Self::Status, NodeAgentError> {
        let spec = spec.defaulting();
        spec.validate()?;

        let containerd_path = ctx.bin_root.join("containerd");
        if !(is_executable(&containerd_path)
            && probe_version_contains(
                ctx.process_runner.as_ref(),
                containerd_path.to_string_lossy().as_ref(),
                &spec.containerd_version,
            )
            .await)
        {
            let bytes = ctx
                .downloader
                .download(&containerd_archive_url(&spec.containerd_version), ctx.download_max_bytes)
                .await
                .map_err(NodeAgentError::from)?;
            extract_tar_gz(&bytes, &ctx.bin_root, ctx.download_max_bytes).map_err(NodeAgentError::from)?;
        }

        let runc_path = ctx.bin_root.join("runc");
        if !(is_executable(&runc_path)
            && probe_version_contains(ctx.process_runner.as_ref(), runc_path.to_string_lossy().as_ref(), &spec.runc_version)
                .await)
        {
            let bytes = ctx
                .downloader
                .download(&runc_url(&spec.runc_version), ctx.download_max_bytes)
                .await
                .map_err(NodeAgentError::from)?;
            crate::file_install::ensure_file(&runc_path, &bytes, 0o755)?;
        }

        Ok(DownloadCriBinariesStatus {
            containerd_version: spec.containerd_version,
            runc_version: spec.runc_version,
        })
    }
}

#[cfg(test)]
#[path = "download_cri_binaries_tests.rs"]
mod tests;
