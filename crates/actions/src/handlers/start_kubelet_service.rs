// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `StartKubeletService` — CA file, env file, bootstrap- or exec-kubeconfig,
//! systemd unit all present; unit started (design §4.2). Which kubeconfig
//! path gets written depends on the resolved auth variant: bootstrap-token
//! auth gets a static token kubeconfig kubelet rotates its own certs from;
//! every other variant gets an exec-plugin kubeconfig invoking the agent
//! binary.

use crate::context::ActionContext;
use crate::file_install::ensure_file;
use crate::handler::ActionHandler;
use crate::render::{render_kubelet_ca, render_kubelet_env, render_kubelet_kubeconfig, render_kubelet_unit};
use crate::{Defaulting, Validate};
use crate::auth::KubeletAuthVariants;
use async_trait::async_trait;
use nodeagent_adapters::service_manager::UnitState;
use nodeagent_core::{NodeAgentError, Redact, TypeUrl};
use serde::{Deserialize, Serialize};

const CA_PATH: &str = "/etc/kubernetes/pki/ca.pem";
const ENV_PATH: &str = "/etc/default/kubelet";
const BOOTSTRAP_KUBECONFIG_PATH: &str = "/etc/kubernetes/bootstrap-kubeconfig";
const KUBELET_KUBECONFIG_PATH: &str = "/etc/kubernetes/kubelet.conf";
const UNIT_NAME: &str = "kubelet.service";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartKubeletServiceSpec {
    pub server: String,
    pub ca_pem: String,
    pub node_ip: String,
    #[serde(default)]
    pub extra_args: Vec<String>,
    #[serde(default)]
    pub auth: KubeletAuthVariants,
}

impl Defaulting for StartKubeletServiceSpec {
    fn defaulting(self) -> Self {
        self
    }
}

impl Validate for StartKubeletServiceSpec {
    fn validate(&self) -> Result<(), NodeAgentError> {
        if !self.server.starts_with("https://") {
            return Err(NodeAgentError::InvalidArgument("server must be an https:// URL".to_string()));
        }
        if self.ca_pem.trim().is_empty() {
            return Err(NodeAgentError::InvalidArgument("caPem must not be empty".to_string()));
        }
        if self.node_ip.trim().is_empty() {
            return Err(NodeAgentError::InvalidArgument("nodeIp must not be empty".to_string()));
        }
        self.auth.validate()
    }
}

impl Redact for StartKubeletServiceSpec {
    fn redact(&mut self) {
        self.auth.redact();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartKubeletServiceStatus {
    pub ca_written: bool,
    pub env_written: bool,
    pub kubeconfig_written: bool,
    pub restarted: bool,
}

pub struct StartKubeletServiceHandler;

#[async_trait]
impl ActionHandler for StartKubeletServiceHandler {
    type Spec = StartKubeletServiceSpec;
    type Status = StartKubeletServiceStatus;

    fn type_url() -> TypeUrl {
        TypeUrl::new("nodeagent.v1.StartKubeletService")
    }

    async fn apply(&self, ctx: &ActionContext, spec: Self::Spec) -> Result<Self::Status, NodeAgentError> {
        let spec = spec.defaulting();
        spec.validate()?;

        let ca_written = ensure_file(&ctx.host_path(CA_PATH), &render_kubelet_ca(&spec.ca_pem), 0o644)?;
        let env_written = ensure_file(&ctx.host_path(ENV_PATH), &render_kubelet_env(&spec.node_ip, &spec.extra_args), 0o644)?;

        let uses_token_auth = spec.auth.uses_token_auth();
        let kubeconfig_path = if uses_token_auth { BOOTSTRAP_KUBECONFIG_PATH } else { KUBELET_KUBECONFIG_PATH };
        let bootstrap_token = spec.auth.bootstrap_token.as_ref().map(|t| t.token.as_str());
        let kubeconfig_bytes = render_kubelet_kubeconfig(
            &spec.server,
            CA_PATH,
            &spec.auth,
            ctx.credential_exec.as_ref(),
            bootstrap_token,
        )?;
        let kubeconfig_written = ensure_file(&ctx.host_path(kubeconfig_path), &kubeconfig_bytes, 0o600)?;

        let any_changed = ca_written || env_written || kubeconfig_written;

        let state = ctx.service_manager.unit_state(UNIT_NAME).await.map_err(NodeAgentError::from)?;
        let mut restarted = false;
        match state {
            UnitState::NotFound => {
                let unit_dir = ctx.systemd_unit_dir();
                std::fs::create_dir_all(&unit_dir).map_err(|e| NodeAgentError::io(&unit_dir, e))?;
                ctx.service_manager
                    .write_unit_file(UNIT_NAME, &render_kubelet_unit(kubeconfig_path, ENV_PATH))
                    .await
                    .map_err(NodeAgentError::from)?;
                ctx.service_manager.daemon_reload().await.map_err(NodeAgentError::from)?;
                ctx.service_manager.start(UNIT_NAME).await.map_err(NodeAgentError::from)?;
                restarted = true;
            }
            UnitState::Active if any_changed => {
                ctx.service_manager.reload_or_restart(UNIT_NAME).await.map_err(NodeAgentError::from)?;
                restarted = true;
            }
            UnitState::Active => {}
            UnitState::Inactive | UnitState::Failed => {
                ctx.service_manager.start(UNIT_NAME).await.map_err(NodeAgentError::from)?;
                restarted = true;
            }
        }

        Ok(StartKubeletServiceStatus { ca_written, env_written, kubeconfig_written, restarted })
    }
}

#[cfg(test)]
#[path = "start_kubelet_service_tests.rs"]
mod tests;
