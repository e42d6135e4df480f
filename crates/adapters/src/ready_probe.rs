// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ReadyProbe` — the kubelet `Ready` condition, "probed externally; treated
//! as a black-box function" (design §4.5).

use async_trait::async_trait;
use nodeagent_core::ReadyState;

#[async_trait]
pub trait ReadyProbe: Send + Sync {
    async fn kubelet_ready(&self) -> ReadyState;
}

/// Production probe: queries the kubelet's own read-only healthz endpoint.
/// Any connection failure or non-200 response is `Unknown`, never an error —
/// the status collector treats this as a plain boolean-ish fact.
pub struct HttpReadyProbe {
    healthz_url: String,
    client: reqwest::Client,
}

impl HttpReadyProbe {
    pub fn new(healthz_url: impl Into<String>) -> Self {
        Self { healthz_url: healthz_url.into(), client: reqwest::Client::new() }
    }
}

#[async_trait]
impl ReadyProbe for HttpReadyProbe {
    async fn kubelet_ready(&self) -> ReadyState {
        match self.client.get(&self.healthz_url).send().await {
            Ok(response) if response.status().is_success() => ReadyState::Ready,
            Ok(_) => ReadyState::NotReady,
            Err(_) => ReadyState::Unknown,
        }
    }
}
