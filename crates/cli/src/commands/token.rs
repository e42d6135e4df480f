// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `nodeagent token kubelogin` — the kubelet credential-exec plugin entry
//! point named by the generated kubeconfig (design §6 "Kubelet
//! credential-exec invocation"). Reads the method/tenant/client-id the
//! kubeconfig's `exec` stanza passed via environment rather than argv, so
//! they never show up in a process listing; acquiring the actual cloud
//! credential is out of scope (design §1 "cloud-provider credential
//! acquisition"), so this always ends in a reported error rather than an
//! `ExecCredential` document on stdout.

use clap::Subcommand;
use nodeagent_core::NodeAgentError;

#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Acquire a kubelet client credential for the kubeconfig exec plugin.
    Kubelogin,
}

pub async fn run(command: TokenCommand) -> Result<(), NodeAgentError> {
    match command {
        TokenCommand::Kubelogin => kubelogin().await,
    }
}

async fn kubelogin() -> Result<(), NodeAgentError> {
    let _method = env_var("NODEAGENT_AUTH_METHOD")?;
    let _client_id = env_var("NODEAGENT_CLIENT_ID")?;
    let _tenant_id = std::env::var("NODEAGENT_TENANT_ID").unwrap_or_default();

    Err(NodeAgentError::Internal(
        "no cloud-provider credential broker is configured in this build".to_string(),
    ))
}

fn env_var(name: &str) -> Result<String, NodeAgentError> {
    std::env::var(name).map_err(|_| NodeAgentError::InvalidArgument(format!("missing required environment variable {name}")))
}
