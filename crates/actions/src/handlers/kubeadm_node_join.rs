// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `KubeadmNodeJoin` — node joined, kubelet active (design §4.2). Presence
//! of the kubelet state directory implies already-joined/joining, so a
//! restart after a partial join never re-runs `kubeadm join`; it just waits
//! for kubelet to come up.

use crate::context::ActionContext;
use crate::handler::ActionHandler;
use crate::{Defaulting, Validate};
use async_trait::async_trait;
use nodeagent_adapters::service_manager::UnitState;
use nodeagent_core::{NodeAgentError, Redact, TypeUrl, BOOTSTRAP_TOKEN_REDACTED};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const KUBELET_STATE_DIR: &str = "/var/lib/kubelet";
const KUBELET_UNIT_NAME: &str = "kubelet.service";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubeadmNodeJoinSpec {
    pub cluster_endpoint: String,
    pub token: String,
    pub discovery_token_ca_cert_hash: String,
    #[serde(default)]
    pub node_name: Option<String>,
}

impl Defaulting for KubeadmNodeJoinSpec {
    fn defaulting(self) -> Self {
        self
    }
}

impl Validate for KubeadmNodeJoinSpec {
    fn validate(&self) -> Result<(), NodeAgentError> {
        if self.cluster_endpoint.trim().is_empty() {
            return Err(NodeAgentError::InvalidArgument("clusterEndpoint must not be empty".to_string()));
        }
        if self.token.trim().is_empty() {
            return Err(NodeAgentError::InvalidArgument("token must not be empty".to_string()));
        }
        if !self.discovery_token_ca_cert_hash.starts_with("sha256:") {
            return Err(NodeAgentError::InvalidArgument(
                "discoveryTokenCaCertHash must be a sha256: digest".to_string(),
            ));
        }
        Ok(())
    }
}

impl Redact for KubeadmNodeJoinSpec {
    fn redact(&mut self) {
        self.token = BOOTSTRAP_TOKEN_REDACTED.to_string();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubeadmNodeJoinStatus {
    pub already_joined: bool,
    pub kubelet_active: bool,
}

pub struct KubeadmNodeJoinHandler;

#[async_trait]
impl ActionHandler for KubeadmNodeJoinHandler {
    type Spec = KubeadmNodeJoinSpec;
    type Status = KubeadmNodeJoinStatus;

    fn type_url() -> TypeUrl {
        TypeUrl::new("nodeagent.v1.KubeadmNodeJoin")
    }

    async fn apply(&self, ctx: &ActionContext, spec: Self::Spec) -> Result<Self::Status, NodeAgentError> {
        let spec = spec.defaulting();
        spec.validate()?;

        let state_dir = ctx.host_path(KUBELET_STATE_DIR);
        let already_joined = state_dir.exists();

        if !already_joined {
            let mut args = vec![
                "join".to_string(),
                spec.cluster_endpoint.trim_start_matches("https://").to_string(),
                "--token".to_string(),
                spec.token.clone(),
                "--discovery-token-ca-cert-hash".to_string(),
                spec.discovery_token_ca_cert_hash.clone(),
            ];
            if let Some(name) = &spec.node_name {
                args.push("--node-name".to_string());
                args.push(name.clone());
            }
            let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
            let output = ctx
                .process_runner
                .run("kubeadm", &arg_refs, Duration::from_secs(120))
                .await
                .map_err(NodeAgentError::from)?;
            if !output.success {
                return Err(NodeAgentError::Internal(format!("kubeadm join failed: {}", output.stderr)));
            }
            std::fs::create_dir_all(&state_dir).map_err(|e| NodeAgentError::io(&state_dir, e))?;
        }

        let kubelet_active = wait_for_kubelet_active(ctx).await?;

        Ok(KubeadmNodeJoinStatus { already_joined, kubelet_active })
    }
}

async fn wait_for_kubelet_active(ctx: &ActionContext) -> Result<bool, NodeAgentError> {
    let deadline = tokio::time::Instant::now() + ctx.kubelet_join_timeout;
    loop {
        if ctx.is_cancelled() {
            return Err(NodeAgentError::Transient("cancelled while waiting for kubelet activation".to_string()));
        }
        let state = ctx.service_manager.unit_state(KUBELET_UNIT_NAME).await.map_err(NodeAgentError::from)?;
        if matches!(state, UnitState::Active) {
            return Ok(true);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(NodeAgentError::Transient(format!(
                "kubelet did not become active within {:?}",
                ctx.kubelet_join_timeout
            )));
        }
        tokio::time::sleep(ctx.kubelet_join_poll_interval).await;
    }
}

#[cfg(test)]
#[path = "kubeadm_node_join_tests.rs"]
mod tests;
