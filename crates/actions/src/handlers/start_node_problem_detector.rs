// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `StartNodeProblemDetector` — rendered config and systemd unit present,
//! service started (design §4.2, §9 open question: the NPD unit is written
//! here under the same write-once rule as kubelet/containerd; see
//! DESIGN.md).

use crate::context::ActionContext;
use crate::file_install::ensure_file;
use crate::handler::ActionHandler;
use crate::render::{render_node_problem_detector_config, render_node_problem_detector_unit};
use crate::{Defaulting, Validate};
use async_trait::async_trait;
use nodeagent_adapters::service_manager::UnitState;
use nodeagent_core::{NodeAgentError, Redact, TypeUrl};
use serde::{Deserialize, Serialize};

const CONFIG_PATH: &str = "/etc/node-problem-detector/npd.json";
const UNIT_NAME: &str = "node-problem-detector.service";
const DEFAULT_KUBELET_LOG_PATH: &str = "/var/log/kubelet.log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartNodeProblemDetectorSpec {
    #[serde(default)]
    pub kubelet_log_path: String,
}

impl Defaulting for StartNodeProblemDetectorSpec {
    fn defaulting(mut self) -> Self {
        if self.kubelet_log_path.is_empty() {
            self.kubelet_log_path = DEFAULT_KUBELET_LOG_PATH.to_string();
        }
        self
    }
}

impl Validate for StartNodeProblemDetectorSpec {
    fn validate(&self) -> Result<(), NodeAgentError> {
        if !self.kubelet_log_path.starts_with('/') {
            return Err(NodeAgentError::InvalidArgument(format!(
                "kubelet_log_path must be absolute: {}",
                self.kubelet_log_path
            )));
        }
        Ok(())
    }
}

impl Redact for StartNodeProblemDetectorSpec {
    fn redact(&mut self) {}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartNodeProblemDetectorStatus {
    pub config_changed: bool,
    pub unit_written: bool,
    pub restarted: bool,
}

pub struct StartNodeProblemDetectorHandler;

#[async_trait]
impl ActionHandler for StartNodeProblemDetectorHandler {
    type Spec = StartNodeProblemDetectorSpec;
    type Status = StartNodeProblemDetectorStatus;

    fn type_url() -> TypeUrl {
        TypeUrl::new("nodeagent.v1.StartNodeProblemDetector")
    }

    async fn apply(&self, ctx: &ActionContext, spec: Self::Spec) -> Result<Self::Status, NodeAgentError> {
        let spec = spec.defaulting();
        spec.validate()?;

        let config_changed = ensure_file(
            &ctx.host_path(CONFIG_PATH),
            &render_node_problem_detector_config(&spec.kubelet_log_path),
            0o644,
        )?;

        let state = ctx.service_manager.unit_state(UNIT_NAME).await.map_err(NodeAgentError::from)?;

        let unit_dir = ctx.systemd_unit_dir();
        std::fs::create_dir_all(&unit_dir).map_err(|e| NodeAgentError::io(&unit_dir, e))?;
        let unit_written = ctx
            .service_manager
            .write_unit_file(UNIT_NAME, &render_node_problem_detector_unit(CONFIG_PATH))
            .await
            .map_err(NodeAgentError::from)?;
        if unit_written {
            ctx.service_manager.daemon_reload().await.map_err(NodeAgentError::from)?;
        }

        let any_changed = config_changed || unit_written;
        let mut restarted = false;
        match state {
            UnitState::NotFound => {
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

        Ok(StartNodeProblemDetectorStatus { config_changed, unit_written, restarted })
    }
}

#[cfg(test)]
#[path = "start_node_problem_detector_tests.rs"]
mod tests;
