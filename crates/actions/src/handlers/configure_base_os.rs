// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ConfigureBaseOS` — required packages present, sysctl file applied
//! (design §4.2). Package installation shells out to `apt-get`; this
//! handler assumes a Debian-family host, matching the rest of the CRI/CNI
//! download handlers' binary-archive assumptions.

use crate::context::ActionContext;
use crate::file_install::ensure_file;
use crate::handler::ActionHandler;
use crate::{Defaulting, Validate};
use async_trait::async_trait;
use nodeagent_core::{NodeAgentError, Redact, TypeUrl};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SYSCTL_PATH: &str = "/etc/sysctl.d/99-kubernetes-cri.conf";

const DEFAULT_PACKAGES: &[&str] = &["conntrack", "socat", "ebtables", "ethtool"];

fn render_sysctl_conf() -> Vec<u8> {
    concat!(
        "net.bridge.bridge-nf-call-iptables = 1\n",
        "net.bridge.bridge-nf-call-ip6tables = 1\n",
        "net.ipv4.ip_forward = 1\n",
    )
    .as_bytes()
    .to_vec()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureBaseOsSpec {
    #[serde(default)]
    pub packages: Vec<String>,
}

impl Defaulting for ConfigureBaseOsSpec {
    fn defaulting(mut self) -> Self {
        if self.packages.is_empty() {
            self.packages = DEFAULT_PACKAGES.iter().map(|s| s.to_string()).collect();
        }
        self
    }
}

impl Validate for ConfigureBaseOsSpec {
    fn validate(&self) -> Result<(), NodeAgentError> {
        if self.packages.iter().any(|p| p.trim().is_empty()) {
            return Err(NodeAgentError::InvalidArgument("empty package name".to_string()));
        }
        Ok(())
    }
}

impl Redact for ConfigureBaseOsSpec {
    fn redact(&mut self) {
        // No secret-bearing fields; present for a uniform bus contract.
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigureBaseOsStatus {
    pub packages_installed: Vec<String>,
    pub sysctl_applied: bool,
}

pub struct ConfigureBaseOsHandler;

#[async_trait]
impl ActionHandler for ConfigureBaseOsHandler {
    type Spec = ConfigureBaseOsSpec;
    type Status = ConfigureBaseOsStatus;

    fn type_url() -> TypeUrl {
        TypeUrl::new("nodeagent.v1.ConfigureBaseOS")
    }

    async fn apply(&self, ctx: &ActionContext, spec: Self::Spec) -> Result<Self::Status, NodeAgentError> {
        let spec = spec.defaulting();
        spec.validate()?;

        let mut installed = Vec::new();
        for package in &spec.packages {
            if !package_installed(ctx, package).await {
                install_package(ctx, package).await?;
            }
            installed.push(package.clone());
        }

        let wrote = ensure_file(&ctx.host_path(SYSCTL_PATH), &render_sysctl_conf(), 0o644)?;
        if wrote {
            apply_sysctl(ctx).await?;
        }

        Ok(ConfigureBaseOsStatus { packages_installed: installed, sysctl_applied: true })
    }
}

async fn package_installed(ctx: &ActionContext, package: &str) -> bool {
    matches!(
        ctx.process_runner.run("dpkg-query", &["-W", package], Duration::from_secs(5)).await,
        Ok(output) if output.success
    )
}

async fn install_package(ctx: &ActionContext, package: &str) -> Result<(), NodeAgentError> {
    let output = ctx
        .process_runner
        .run("apt-get", &["install", "-y", package], Duration::from_secs(120))
        .await
        .map_err(|e| NodeAgentError::Internal(e.to_string()))?;
    if !output.success {
        return Err(NodeAgentError::Internal(format!(
            "failed to install package {package}: {}",
            output.stderr
        )));
    }
    Ok(())
}

async fn apply_sysctl(ctx: &ActionContext) -> Result<(), NodeAgentError> {
    let output = ctx
        .process_runner
        .run("sysctl", &["--system"], Duration::from_secs(30))
        .await
        .map_err(|e| NodeAgentError::Internal(e.to_string()))?;
    if !output.success {
        return Err(NodeAgentError::Internal(format!("sysctl --system failed: {}", output.stderr)));
    }
    Ok(())
}

#[cfg(test)]
#[path = "configure_base_os_tests.rs"]
mod tests;
