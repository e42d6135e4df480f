// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A detector's output (design §4.6): a [`Finding`] carries an ID, a human
//! title, details, and an optional [`Remediation`] request. Collapsing many
//! findings into one coherent plan is [`crate::plan::resolve_plan`]'s job.

use serde::{Deserialize, Serialize};

/// What remediation, if any, a finding is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemediationAction {
    Unspecified,
    KubernetesUpgrade,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remediation {
    pub action: RemediationAction,
    #[serde(default)]
    pub kubernetes_version: Option<String>,
}

impl Remediation {
    pub fn unspecified() -> Self {
        Self { action: RemediationAction::Unspecified, kubernetes_version: None }
    }

    pub fn kubernetes_upgrade(version: impl Into<String>) -> Self {
        Self { action: RemediationAction::KubernetesUpgrade, kubernetes_version: Some(version.into()) }
    }
}

/// One detector output (design §4.6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub title: String,
    pub details: String,
    pub remediation: Remediation,
}
