// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DownloadNodeProblemDetector` — `node-problem-detector` binary present at
//! the requested version (design §4.2). Ships as a gzip-wrapped tarball
//! with a single binary at its root.

use crate::context::ActionContext;
use crate::file_install::is_executable;
use crate::handler::ActionHandler;
use crate::{Defaulting, Validate};
use async_trait::async_trait;
use nodeagent_adapters::{extract_tar_gz, probe_version_contains};
use nodeagent_core::version::parse_major_minor;
use nodeagent_core::{NodeAgentError, Redact, TypeUrl};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NPD_VERSION: &str = "0.8.20";
pub const BINARY_NAME: &str = "node-problem-detector";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadNodeProblemDetectorSpec {
    #[serde(default)]
    pub npd_version: String,
}

impl Defaulting for DownloadNodeProblemDetectorSpec {
    fn defaulting(mut self) -> Self {
        if self.npd_version.trim().is_empty() {
            self.npd_version = DEFAULT_NPD_VERSION.to_string();
        }
        self
    }
}

impl Validate for DownloadNodeProblemDetectorSpec {
    fn validate(&self) -> Result<(), NodeAgentError> {
        if parse_major_minor(&self.npd_version).is_none() {
            return Err(NodeAgentError::InvalidArgument(format!("unparsable npdVersion: {}", self.npd_version)));
        }
        Ok(())
    }
}

impl Redact for DownloadNodeProblemDetectorSpec {
    fn redact(&mut self) {}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadNodeProblemDetectorStatus {
    pub downloaded: bool,
}

pub struct DownloadNodeProblemDetectorHandler;

fn npd_archive_url(version: &str) -> String {
    format!("https://github.com/kubernetes/node-problem-detector/releases/download/v{version}/node-problem-detector-v{version}-linux_amd64.tar.gz")
}

#[async_trait]
impl ActionHandler for DownloadNodeProblemDetectorHandler {
    type Spec = DownloadNodeProblemDetectorSpec;
    type Status = DownloadNodeProblemDetectorStatus;

    fn type_url() -> TypeUrl {
        TypeUrl::new("nodeagent.v1.DownloadNodeProblemDetector")
    }

    async fn apply(&self, ctx: &ActionContext, spec: Self::Spec) -> Result<Self::Status, NodeAgentError> {
        let spec = spec.defaulting();
        spec.validate()?;

        let path = ctx.bin_root.join(BINARY_NAME);
        let current = is_executable(&path)
            && probe_version_contains(ctx.process_runner.as_ref(), path.to_string_lossy().as_ref(), &spec.npd_version).await;

        let downloaded = if !current {
            let bytes = ctx
                .downloader
                .download(&npd_archive_url(&spec.npd_version), ctx.download_max_bytes)
                .await
                .map_err(NodeAgentError::from)?;
            extract_tar_gz(&bytes, &ctx.bin_root, ctx.download_max_bytes).map_err(NodeAgentError::from)?;
            true
        } else {
            false
        };

        Ok(DownloadNodeProblemDetectorStatus { downloaded })
    }
}

#[cfg(test)]
#[path = "download_node_problem_detector_tests.rs"]
mod tests;
