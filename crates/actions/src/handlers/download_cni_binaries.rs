// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DownloadCNIBinaries` — `bridge`, `host-local`, `loopback` plugins
//! present at the requested version (design §4.2). All three ship in a
//! single gzip-wrapped tarball from the upstream plugins release.

use crate::context::ActionContext;
use crate::file_install::is_executable;
use crate::handler::ActionHandler;
use crate::{Defaulting, Validate};
use async_trait::async_trait;
use nodeagent_adapters::{extract_tar_gz, probe_version_contains};
use nodeagent_core::version::parse_major_minor;
use nodeagent_core::{NodeAgentError, Redact, TypeUrl};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CNI_VERSION: &str = "1.5.1";

pub const REQUIRED_PLUGINS: &[&str] = &["bridge", "host-local", "loopback"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadCniBinariesSpec {
    #[serde(default)]
    pub cni_plugins_version: String,
}

impl Defaulting for DownloadCniBinariesSpec {
    fn defaulting(mut self) -> Self {
        if self.cni_plugins_version.trim().is_empty() {
            self.cni_plugins_version = DEFAULT_CNI_VERSION.to_string();
        }
        self
    }
}

impl Validate for DownloadCniBinariesSpec {
    fn validate(&self) -> Result<(), NodeAgentError> {
        if parse_major_minor(&self.cni_plugins_version).is_none() {
            return Err(NodeAgentError::InvalidArgument(format!(
                "unparsable cniPluginsVersion: {}",
                self.cni_plugins_version
            )));
        }
        Ok(())
    }
}

impl Redact for DownloadCniBinariesSpec {
    fn redact(&mut self) {}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadCniBinariesStatus {
    pub plugins_installed: Vec<String>,
}

pub struct DownloadCniBinariesHandler;

fn cni_archive_url(version: &str) -> String {
    format!("https://github.com/containernetworking/plugins/releases/download/v{version}/cni-plugins-linux-amd64-v{version}.tgz")
}

#[async_trait]
impl ActionHandler for DownloadCniBinariesHandler {
    type Spec = DownloadCniBinariesSpec;
    type Status = DownloadCniBinariesStatus;

    fn type_url() -> TypeUrl {
        TypeUrl::new("nodeagent.v1.DownloadCNIBinaries")
    }

    async fn apply(&self, ctx: &ActionContext, spec: Self::Spec) -> Result<Self::Status, NodeAgentError> {
        let spec = spec.defaulting();
        spec.validate()?;

        let mut missing = false;
        for plugin in REQUIRED_PLUGINS {
            let path = ctx.cni_bin_root.join(plugin);
            let current = is_executable(&path)
                && probe_version_contains(ctx.process_runner.as_ref(), path.to_string_lossy().as_ref(), &spec.cni_plugins_version)
                    .await;
            if !current {
                missing = true;
            }
        }

        if missing {
            let bytes = ctx
                .downloader
                .download(&cni_archive_url(&spec.cni_plugins_version), ctx.download_max_bytes)
                .await
                .map_err(NodeAgentError::from)?;
            extract_tar_gz(&bytes, &ctx.cni_bin_root, ctx.download_max_bytes).map_err(NodeAgentError::from)?;
        }

        Ok(DownloadCniBinariesStatus {
            plugins_installed: REQUIRED_PLUGINS.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[cfg(test)]
#[path = "download_cni_binaries_tests.rs"]
mod tests;
