// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `nodeagent unbootstrap` — runs the reverse/cleanup step list
//! best-effort (design §4.3, §6): every step is attempted regardless of
//! earlier failures, and a partially-failed run still exits zero.

use nodeagent_bus::Dispatcher;
use nodeagent_core::NodeAgentError;
use nodeagent_daemon::{supervisor::build_action_context, Config};
use nodeagent_executor::executor::{BootstrapExecutor, FailurePolicy};
use nodeagent_executor::plan::unbootstrap;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub async fn run(config: &Config) -> Result<(), NodeAgentError> {
    let ctx = build_action_context(config, CancellationToken::new());
    let dispatcher = Dispatcher::new(nodeagent_bus::registry::build()?, ctx);
    let executor = BootstrapExecutor::new(dispatcher);

    let result = executor.run(unbootstrap(), FailurePolicy::BestEffort).await;

    for step in &result.steps {
        if step.success {
            info!(step = %step.name, duration_ms = step.duration.as_millis() as u64, "unbootstrap: step complete");
        } else {
            warn!(step = %step.name, error = ?step.error, "unbootstrap: step failed, continuing (best-effort)");
        }
    }

    if !result.success {
        warn!("unbootstrap: completed with partial failures; not propagated as an error (design §4.3)");
    } else {
        info!(step_count = result.step_count, "unbootstrap: all steps completed");
    }

    Ok(())
}
