// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `CredentialExecPlugin` — the seam for "kubelet exec-plugin token
//! acquisition" (design §4.6): rendered kubeconfigs for managed-identity,
//! service-principal, and registration-credential auth shell out to this
//! binary at token-refresh time rather than embedding a static token. The
//! self-exec plugin always points back at the running agent binary.

/// Which Azure AD auth method the exec plugin should use when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecAuthMethod {
    Spn,
    Msi,
}

impl ExecAuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecAuthMethod::Spn => "spn",
            ExecAuthMethod::Msi => "msi",
        }
    }
}

/// The exec-plugin command line rendered into a kubeconfig's `exec` stanza:
/// a binary path, its arguments, and the environment variables that tell
/// the invoked process which identity to acquire a token for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecCommand {
    pub command: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

pub trait CredentialExecPlugin: Send + Sync {
    fn exec_command(&self, method: ExecAuthMethod, tenant: &str, client_id: &str) -> ExecCommand;
}

/// Points the exec plugin back at the currently running agent binary,
/// invoked as `<binary> token kubelogin` with the method/tenant/client-id
/// passed via environment rather than argv, so they never show up in a
/// process listing.
pub struct SelfExecPlugin {
    binary_path: String,
}

impl SelfExecPlugin {
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self { binary_path: binary_path.into() }
    }
}

impl CredentialExecPlugin for SelfExecPlugin {
    fn exec_command(&self, method: ExecAuthMethod, tenant: &str, client_id: &str) -> ExecCommand {
        ExecCommand {
            command: self.binary_path.clone(),
            args: vec!["token".to_string(), "kubelogin".to_string()],
            env: vec![
                ("NODEAGENT_AUTH_METHOD".to_string(), method.as_str().to_string()),
                ("NODEAGENT_TENANT_ID".to_string(), tenant.to_string()),
                ("NODEAGENT_CLIENT_ID".to_string(), client_id.to_string()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msi_exec_command_omits_tenant() {
        let plugin = SelfExecPlugin::new("/usr/local/bin/nodeagent");
        let cmd = plugin.exec_command(ExecAuthMethod::Msi, "", "client-123");
        assert_eq!(cmd.command, "/usr/local/bin/nodeagent");
        assert_eq!(cmd.args, vec!["token".to_string(), "kubelogin".to_string()]);
        assert!(cmd.env.contains(&("NODEAGENT_AUTH_METHOD".to_string(), "msi".to_string())));
        assert!(cmd.env.contains(&("NODEAGENT_CLIENT_ID".to_string(), "client-123".to_string())));
    }

    #[test]
    fn spn_exec_command_includes_tenant() {
        let plugin = SelfExecPlugin::new("/usr/local/bin/nodeagent");
        let cmd = plugin.exec_command(ExecAuthMethod::Spn, "tenant-abc", "client-123");
        assert!(cmd.env.contains(&("NODEAGENT_AUTH_METHOD".to_string(), "spn".to_string())));
        assert!(cmd.env.contains(&("NODEAGENT_TENANT_ID".to_string(), "tenant-abc".to_string())));
    }
}
