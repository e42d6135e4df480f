// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Dispatcher`] — a [`Registry`] bound to one [`ActionContext`], shared by
//! the in-process channel (the bootstrap executor calls it directly) and
//! the loopback socket transport (design §4.1 "two transports with
//! identical semantics").

use crate::envelope::ActionEnvelope;
use crate::registry::Registry;
use nodeagent_actions::ActionContext;
use nodeagent_core::NodeAgentError;
use std::sync::Arc;

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    ctx: ActionContext,
}

impl Dispatcher {
    pub fn new(registry: Registry, ctx: ActionContext) -> Self {
        Self { registry: Arc::new(registry), ctx }
    }

    pub async fn apply(&self, envelope: ActionEnvelope) -> Result<ActionEnvelope, NodeAgentError> {
        self.registry.dispatch(&self.ctx, envelope).await
    }

    pub fn context(&self) -> &ActionContext {
        &self.ctx
    }
}
