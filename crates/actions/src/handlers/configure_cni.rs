// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ConfigureCNI` — bridge-network config file present at the requested
//! spec version (design §4.2). Writes a single `10-containerd-net.conflist`
//! under the CNI config directory; actual plugin binaries are handled by
//! `DownloadCNIBinaries`.

use crate::context::ActionContext;
use crate::file_install::ensure_file;
use crate::handler::ActionHandler;
use crate::{Defaulting, Validate};
use async_trait::async_trait;
use nodeagent_core::{NodeAgentError, Redact, TypeUrl};
use serde::{Deserialize, Serialize};

const CNI_CONFIG_PATH: &str = "/etc/cni/net.d/10-containerd-net.conflist";

const DEFAULT_CNI_SPEC_VERSION: &str = "1.0.0";

fn render_cni_bridge_config(cni_spec_version: &str) -> Vec<u8> {
    format!(
        "{{
  \"cniVersion\": \"{cni_spec_version}\",
  \"name\": \"containerd-net\",
  \"plugins\": [
    {{
      \"type\": \"bridge\",
      \"bridge\": \"cni0\",
      \"isGateway\": true,
      \"ipMasq\": true,
      \"promiscMode\": true,
      \"ipam\": {{
        \"type\": \"host-local\",
        \"ranges\": [[{{ \"subnet\": \"10.244.0.0/16\" }}]],
        \"routes\": [{{ \"dst\": \"0.0.0.0/0\" }}]
      }}
    }},
    {{ \"type\": \"portmap\", \"capabilities\": {{ \"portMappings\": true }} }}
  ]
}}
"
    )
    .into_bytes()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureCniSpec {
    #[serde(default)]
    pub cni_spec_version: String,
}

impl Defaulting for ConfigureCniSpec {
    fn defaulting(mut self) -> Self {
        if self.cni_spec_version.trim().is_empty() {
            self.cni_spec_version = DEFAULT_CNI_SPEC_VERSION.to_string();
        }
        self
    }
}

impl Validate for ConfigureCniSpec {
    fn validate(&self) -> Result<(), NodeAgentError> {
        if self.cni_spec_version.trim().is_empty() {
            return Err(NodeAgentError::InvalidArgument("cniSpecVersion must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Redact for ConfigureCniSpec {
    fn redact(&mut self) {}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigureCniStatus {
    pub config_changed: bool,
}

pub struct ConfigureCniHandler;

#[async_trait]
impl ActionHandler for ConfigureCniHandler {
    type Spec = ConfigureCniSpec;
    type Status = ConfigureCniStatus;

    fn type_url() -> TypeUrl {
        TypeUrl::new("nodeagent.v1.ConfigureCNI")
    }

    async fn apply(&self, ctx: &ActionContext, spec: Self::Spec) -> Result<Self::Status, NodeAgentError> {
        let spec = spec.defaulting();
        spec.validate()?;

        let desired = render_cni_bridge_config(&spec.cni_spec_version);
        let config_changed = ensure_file(&ctx.host_path(CNI_CONFIG_PATH), &desired, 0o644)?;

        Ok(ConfigureCniStatus { config_changed })
    }
}

#[cfg(test)]
#[path = "configure_cni_tests.rs"]
mod tests;
