// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `StartContainerdService` — rendered TOML, optional GPU drop-ins, service
//! started (design §4.2). Unit file is write-once (design §9 open
//! question, resolved in DESIGN.md): a later divergence only warns.

use crate::context::ActionContext;
use crate::file_install::ensure_file;
use crate::handler::ActionHandler;
use crate::render::{content_matches, render_containerd_config};
use crate::{Defaulting, Validate};
use async_trait::async_trait;
use nodeagent_adapters::service_manager::UnitState;
use nodeagent_core::{NodeAgentError, Redact, TypeUrl};
use serde::{Deserialize, Serialize};
use tracing::warn;

const CONFIG_PATH: &str = "/etc/containerd/config.toml";
const GPU_DROP_IN_PATH: &str = "/etc/containerd/conf.d/99-nvidia-runtime.toml";
const UNIT_NAME: &str = "containerd.service";

const DEFAULT_SANDBOX_IMAGE: &str = "registry.k8s.io/pause:3.9";
const DEFAULT_RUNTIME_ROOT: &str = "/var/lib/containerd";

fn render_nvidia_runtime_drop_in() -> Vec<u8> {
    "[plugins.\"io.containerd.grpc.v1.cri\".containerd.runtimes.nvidia]\n\
     runtime_type = \"io.containerd.runc.v2\"\n\
     [plugins.\"io.containerd.grpc.v1.cri\".containerd.runtimes.nvidia.options]\n\
     BinaryName = \"/usr/bin/nvidia-container-runtime\"\n"
        .as_bytes()
        .to_vec()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartContainerdServiceSpec {
    #[serde(default)]
    pub sandbox_image: String,
    #[serde(default)]
    pub runtime_root: String,
    #[serde(default)]
    pub gpu_runtime: bool,
}

impl Defaulting for StartContainerdServiceSpec {
    fn defaulting(mut self) -> Self {
        if self.sandbox_image.is_empty() {
            self.sandbox_image = DEFAULT_SANDBOX_IMAGE.to_string();
        }
        if self.runtime_root.is_empty() {
            self.runtime_root = DEFAULT_RUNTIME_ROOT.to_string();
        }
        self
    }
}

impl Validate for StartContainerdServiceSpec {
    fn validate(&self) -> Result<(), NodeAgentError> {
        if !self.runtime_root.starts_with('/') {
            return Err(NodeAgentError::InvalidArgument(format!(
                "runtime_root must be absolute: {}",
                self.runtime_root
            )));
        }
        Ok(())
    }
}

impl Redact for StartContainerdServiceSpec {
    fn redact(&mut self) {}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartContainerdServiceStatus {
    pub config_changed: bool,
    pub gpu_drop_in_written: bool,
    pub restarted: bool,
}

pub struct StartContainerdServiceHandler;

#[async_trait]
impl ActionHandler for StartContainerdServiceHandler {
    type Spec = StartContainerdServiceSpec;
    type Status = StartContainerdServiceStatus;

    fn type_url() -> TypeUrl {
        TypeUrl::new("nodeagent.v1.StartContainerdService")
    }

    async fn apply(&self, ctx: &ActionContext, spec: Self::Spec) -> Result<Self::Status, NodeAgentError> {
        let spec = spec.defaulting();
        spec.validate()?;

        let desired_config = render_containerd_config(&spec.sandbox_image, &spec.runtime_root);
        let config_changed = ensure_file(&ctx.host_path(CONFIG_PATH), &desired_config, 0o644)?;

        let mut gpu_drop_in_written = false;
        if spec.gpu_runtime {
            gpu_drop_in_written =
                ensure_file(&ctx.host_path(GPU_DROP_IN_PATH), &render_nvidia_runtime_drop_in(), 0o644)?;
        }

        let state = ctx
            .service_manager
            .unit_state(UNIT_NAME)
            .await
            .map_err(NodeAgentError::from)?;

        let any_changed = config_changed || gpu_drop_in_written;
        let mut restarted = false;
        match state {
            UnitState::NotFound => {
                // design §9 open question: containerd.service is write-once
                // after the first write. Warn rather than overwrite if a
                // later spec's desired content has since diverged.
                let unit_dir = ctx.systemd_unit_dir();
                std::fs::create_dir_all(&unit_dir).map_err(|e| NodeAgentError::io(&unit_dir, e))?;
                ctx.service_manager
                    .write_unit_file(UNIT_NAME, containerd_unit_contents().as_bytes())
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

        if any_changed {
            if let Ok(on_disk) = std::fs::read(ctx.systemd_unit_dir().join(UNIT_NAME)) {
                if !content_matches(containerd_unit_contents().as_bytes(), &on_disk) {
                    warn!("containerd.service on disk diverges from the desired rendering; unit files are write-once, leaving as-is");
                }
            }
        }

        Ok(StartContainerdServiceStatus { config_changed, gpu_drop_in_written, restarted })
    }
}

fn containerd_unit_contents() -> String {
    "[Unit]
Description=containerd container runtime
After=network.target

[Service]
ExecStartPre=-/sbin/modprobe overlay
ExecStart=/usr/local/bin/containerd
Restart=always
RestartSec=5
Delegate=yes
KillMode=process

[Install]
WantedBy=multi-user.target
"
    .to_string()
}

#[cfg(test)]
#[path = "start_containerd_service_tests.rs"]
mod tests;
