// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The wire-level action envelope the dispatch bus passes between a
//! caller and a registered handler (design §3 "action message", §6
//! "action document format").
//!
//! `spec` and `status` are carried as untyped JSON so the registry can be
//! keyed by [`TypeUrl`] alone; each [`crate::registry::Registry`] entry
//! knows how to deserialize its own concrete spec/status types.

use nodeagent_core::ActionMetadata;
use serde::{Deserialize, Serialize};

/// One action document, as it crosses the dispatch bus (design §4.1, §6).
///
/// Documents may be a single object or a JSON array applied in order
/// (design §6); array handling is the caller's concern (the `apply` CLI),
/// not the envelope's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub metadata: ActionMetadata,
    pub spec: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
}

impl ActionEnvelope {
    pub fn new(metadata: ActionMetadata, spec: serde_json::Value) -> Self {
        Self { metadata, spec, status: None }
    }
}
