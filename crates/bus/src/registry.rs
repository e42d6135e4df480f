// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide type-URL registry and dispatcher (design §4.1, C1): maps a
//! message's stable type-URL to exactly one registered handler and invokes
//! it synchronously from the caller's perspective. Registration happens
//! once at process start via [`build`]; duplicate registration is a
//! programming error that aborts startup.

use crate::envelope::ActionEnvelope;
use async_trait::async_trait;
use nodeagent_actions::handlers;
use nodeagent_actions::{ActionContext, ActionHandler};
use nodeagent_core::{NodeAgentError, Redact, TypeUrl};
use std::collections::HashMap;
use std::sync::Arc;

/// Type-erased handler entry so [`Registry`] can hold a uniform value per
/// type-URL regardless of each handler's concrete `Spec`/`Status` types.
#[async_trait]
trait ErasedHandler: Send + Sync {
    async fn dispatch(&self, ctx: &ActionContext, envelope: ActionEnvelope) -> Result<ActionEnvelope, NodeAgentError>;
}

struct HandlerEntry<H>(H);

#[async_trait]
impl<H: ActionHandler + 'static> ErasedHandler for HandlerEntry<H> {
    async fn dispatch(&self, ctx: &ActionContext, mut envelope: ActionEnvelope) -> Result<ActionEnvelope, NodeAgentError> {
        let spec: H::Spec = serde_json::from_value(envelope.spec.clone()).map_err(|e| {
            NodeAgentError::InvalidArgument(format!(
                "{}: malformed spec: {e}",
                envelope.metadata.type_url
            ))
        })?;

        let mut echoed_spec = spec.clone();
        let status = self.0.apply(ctx, spec).await?;
        echoed_spec.redact();

        envelope.spec = serde_json::to_value(echoed_spec)?;
        envelope.status = Some(serde_json::to_value(status)?);
        Ok(envelope)
    }
}

/// A process-wide map from stable type-URL to registered handler (design
/// §4.1). Construct via [`build`]; register additional handlers only at
/// process start.
#[derive(Clone, Default)]
pub struct Registry {
    handlers: HashMap<TypeUrl, Arc<dyn ErasedHandler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under its own [`TypeUrl`]. Duplicate registration
    /// is a programming error that aborts startup.
    pub fn register<H: ActionHandler + 'static>(&mut self, handler: H) -> Result<(), NodeAgentError> {
        let type_url = H::type_url();
        let erased: Arc<dyn ErasedHandler> = Arc::new(HandlerEntry(handler));
        if self.handlers.insert(type_url.clone(), erased).is_some() {
            return Err(NodeAgentError::Fatal(format!("duplicate handler registration for {type_url}")));
        }
        Ok(())
    }

    /// Dispatch one envelope through its registered handler. Unknown
    /// type-URL is `InvalidArgument`.
    pub async fn dispatch(&self, ctx: &ActionContext, envelope: ActionEnvelope) -> Result<ActionEnvelope, NodeAgentError> {
        let handler = self.handlers.get(&envelope.metadata.type_url).ok_or_else(|| {
            NodeAgentError::InvalidArgument(format!("unknown action type: {}", envelope.metadata.type_url))
        })?;
        handler.dispatch(ctx, envelope).await
    }

    pub fn contains(&self, type_url: &TypeUrl) -> bool {
        self.handlers.contains_key(type_url)
    }
}

/// Build the process-wide registry, registering every action handler in
/// the handler table (design §4.2).
pub fn build() -> Result<Registry, NodeAgentError> {
    let mut registry = Registry::new();
    registry.register(handlers::ConfigureBaseOsHandler)?;
    registry.register(handlers::ConfigureCniHandler)?;
    registry.register(handlers::DownloadCniBinariesHandler)?;
    registry.register(handlers::DownloadCriBinariesHandler)?;
    registry.register(handlers::DownloadKubeBinariesHandler)?;
    registry.register(handlers::DownloadNodeProblemDetectorHandler)?;
    registry.register(handlers::KubeadmNodeJoinHandler)?;
    registry.register(handlers::StartContainerdServiceHandler)?;
    registry.register(handlers::StartKubeletServiceHandler)?;
    registry.register(handlers::StartNodeProblemDetectorHandler)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_registers_every_handler() {
        let registry = build().unwrap();
        assert!(registry.contains(&handlers::ConfigureBaseOsHandler::type_url()));
        assert!(registry.contains(&handlers::ConfigureCniHandler::type_url()));
        assert!(registry.contains(&handlers::DownloadCniBinariesHandler::type_url()));
        assert!(registry.contains(&handlers::DownloadCriBinariesHandler::type_url()));
        assert!(registry.contains(&handlers::DownloadKubeBinariesHandler::type_url()));
        assert!(registry.contains(&handlers::DownloadNodeProblemDetectorHandler::type_url()));
        assert!(registry.contains(&handlers::KubeadmNodeJoinHandler::type_url()));
        assert!(registry.contains(&handlers::StartContainerdServiceHandler::type_url()));
        assert!(registry.contains(&handlers::StartKubeletServiceHandler::type_url()));
        assert!(registry.contains(&handlers::StartNodeProblemDetectorHandler::type_url()));
    }

    #[test]
    fn duplicate_registration_is_fatal() {
        let mut registry = Registry::new();
        registry.register(handlers::ConfigureBaseOsHandler).expect("first registration succeeds");
        let err = registry.register(handlers::ConfigureBaseOsHandler).unwrap_err();
        assert!(matches!(err, NodeAgentError::Fatal(_)));
    }
}
