// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-action-type contract every handler implements (design §4.2):
//! a `Spec` describing desired state, a `Status` reporting what was found
//! and changed, and an idempotent `apply` step in between.

use crate::context::ActionContext;
use async_trait::async_trait;
use nodeagent_core::{NodeAgentError, Redact, TypeUrl};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Fills in spec fields left at their zero value with the handler's
/// defaults. Idempotent: `defaulting(defaulting(s)) == defaulting(s)`.
pub trait Defaulting {
    fn defaulting(self) -> Self;
}

/// Rejects a spec that cannot be safely applied. Always called after
/// `defaulting()`, never before.
pub trait Validate {
    fn validate(&self) -> Result<(), NodeAgentError>;
}

#[async_trait]
pub trait ActionHandler: Send + Sync {
    type Spec: Serialize + DeserializeOwned + Clone + Defaulting + Validate + Redact + Send + Sync + 'static;
    type Status: Serialize + DeserializeOwned + Send + Sync + 'static;

    fn type_url() -> TypeUrl
    where
        Self: Sized;

    /// Read spec → default+validate → check current host state → perform
    /// only the minimal mutation needed → report status (design §4.2).
    async fn apply(&self, ctx: &ActionContext, spec: Self::Spec) -> Result<Self::Status, NodeAgentError>;
}
