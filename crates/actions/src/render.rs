// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure config-rendering functions. Every handler that writes a config or
//! unit file renders the desired bytes here, then hands them to
//! `file_install::ensure_file` for the actual (possibly no-op) write — kept
//! separate so rendering can be unit-tested without touching a filesystem.

use crate::auth::{KubeletAuthVariants, ResolvedAuth};
use nodeagent_adapters::credential_exec::ExecCommand;
use nodeagent_adapters::CredentialExecPlugin;
use nodeagent_core::NodeAgentError;

pub fn render_kubelet_env(node_ip: &str, extra_args: &[String]) -> Vec<u8> {
    let mut args = vec![format!("--node-ip={node_ip}")];
    args.extend(extra_args.iter().cloned());
    format!("KUBELET_EXTRA_ARGS=\"{}\"\n", args.join(" ")).into_bytes()
}

pub fn render_kubelet_ca(ca_pem: &str) -> Vec<u8> {
    ca_pem.as_bytes().to_vec()
}

pub fn render_bootstrap_kubeconfig(server: &str, ca_path: &str, token: &str) -> Vec<u8> {
    format!(
        "apiVersion: v1
kind: Config
clusters:
- cluster:
    server: {server}
    certificate-authority: {ca_path}
  name: default
contexts:
- context:
    cluster: default
    user: kubelet-bootstrap
  name: default
current-context: default
users:
- name: kubelet-bootstrap
  user:
    token: {token}
"
    )
    .into_bytes()
}

/// Render a kubeconfig whose user block invokes the agent binary as an
/// exec-credential plugin, per `exec`'s command/args/env.
fn render_exec_kubeconfig(server: &str, ca_path: &str, exec: &ExecCommand) -> Vec<u8> {
    let args_yaml = exec
        .args
        .iter()
        .map(|a| format!("      - {a}"))
        .collect::<Vec<_>>()
        .join("\n");
    let env_yaml = exec
        .env
        .iter()
        .map(|(k, v)| format!("      - name: {k}\n        value: \"{v}\""))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "apiVersion: v1
kind: Config
clusters:
- cluster:
    server: {server}
    certificate-authority: {ca_path}
  name: default
contexts:
- context:
    cluster: default
    user: kubelet-exec
  name: default
current-context: default
users:
- name: kubelet-exec
  user:
    exec:
      apiVersion: client.authentication.k8s.io/v1
      command: {command}
{args_yaml}
      env:
{env_yaml}
",
        command = exec.command
    )
    .into_bytes()
}

/// Choose which kubeconfig to render for a resolved kubelet auth variant
/// (design §4.6): a bootstrap token renders a static token kubeconfig;
/// every other variant renders an exec-plugin kubeconfig that shells back
/// out to the agent binary for token acquisition at refresh time.
pub fn render_kubelet_kubeconfig(
    server: &str,
    ca_path: &str,
    auth: &KubeletAuthVariants,
    credential_exec: &dyn CredentialExecPlugin,
    bootstrap_token: Option<&str>,
) -> Result<Vec<u8>, NodeAgentError> {
    let Some(resolved) = auth.resolve() else {
        return Err(NodeAgentError::InvalidArgument(
            "kubelet auth: exactly one variant must be set, none were".to_string(),
        ));
    };

    Ok(match resolved {
        ResolvedAuth::BootstrapToken(_) => render_bootstrap_kubeconfig(
            server,
            ca_path,
            bootstrap_token.unwrap_or_default(),
        ),
        ResolvedAuth::ManagedIdentity(identity) => {
            let exec = credential_exec.exec_command(
                nodeagent_adapters::ExecAuthMethod::Msi,
                "",
                &identity.client_id,
            );
            render_exec_kubeconfig(server, ca_path, &exec)
        }
        ResolvedAuth::ServicePrincipal(spn) => {
            let exec = credential_exec.exec_command(
                nodeagent_adapters::ExecAuthMethod::Spn,
                &spn.tenant_id,
                &spn.client_id,
            );
            render_exec_kubeconfig(server, ca_path, &exec)
        }
        ResolvedAuth::RegistrationCredential(cred) => {
            let exec = credential_exec.exec_command(
                nodeagent_adapters::ExecAuthMethod::Msi,
                "",
                &cred.credential_ref,
            );
            render_exec_kubeconfig(server, ca_path, &exec)
        }
    })
}

pub fn render_kubelet_unit(kubeconfig_path: &str, env_file_path: &str) -> Vec<u8> {
    format!(
        "[Unit]
Description=Kubernetes kubelet
After=network.target containerd.service

[Service]
EnvironmentFile={env_file_path}
ExecStart=/usr/local/bin/kubelet \\
  --kubeconfig={kubeconfig_path} \\
  --container-runtime-endpoint=unix:///run/containerd/containerd.sock
Restart=always
RestartSec=5

[Install]
WantedBy=multi-user.target
"
    )
    .into_bytes()
}

pub fn render_node_problem_detector_config(kubelet_log_path: &str) -> Vec<u8> {
    format!(
        "{{
  \"plugin\": \"journald\",
  \"logPath\": \"{kubelet_log_path}\",
  \"lookback\": \"5m\",
  \"bufferSize\": 10,
  \"source\": \"kernel-monitor\",
  \"conditions\": [
    {{ \"type\": \"KernelDeadlock\", \"reason\": \"KernelHasNoDeadlock\" }}
  ]
}}
"
    )
    .into_bytes()
}

pub fn render_node_problem_detector_unit(config_path: &str) -> Vec<u8> {
    format!(
        "[Unit]
Description=Kubernetes node-problem-detector
After=network.target

[Service]
ExecStart=/usr/local/bin/node-problem-detector --config.system-log-monitor={config_path}
Restart=always
RestartSec=5

[Install]
WantedBy=multi-user.target
"
    )
    .into_bytes()
}

/// Renders the containerd `config.toml`: sandbox (pause) image and the
/// runtime root directory are the only host-specific knobs; a GPU drop-in
/// layers on top of this via systemd rather than templating it in here.
pub fn render_containerd_config(sandbox_image: &str, root_dir: &str) -> Vec<u8> {
    format!(
        "version = 2
root = \"{root_dir}\"

[plugins.\"io.containerd.grpc.v1.cri\"]
  sandbox_image = \"{sandbox_image}\"

[plugins.\"io.containerd.grpc.v1.cri\".containerd]
  snapshotter = \"overlayfs\"

[plugins.\"io.containerd.grpc.v1.cri\".containerd.runtimes.runc]
  runtime_type = \"io.containerd.runc.v2\"

[plugins.\"io.containerd.grpc.v1.cri\".containerd.runtimes.runc.options]
  SystemdCgroup = true
"
    )
    .into_bytes()
}

/// Trim trailing whitespace from every line before comparing rendered
/// content against disk, so re-running a handler against a file that
/// differs only by trailing whitespace doesn't trigger a spurious rewrite.
fn normalize_for_compare(bytes: &[u8]) -> Vec<u8> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .into_bytes()
}

pub fn content_matches(desired: &[u8], on_disk: &[u8]) -> bool {
    normalize_for_compare(desired) == normalize_for_compare(on_disk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_matches_ignores_trailing_whitespace() {
        let desired = b"line one\nline two\n";
        let on_disk = b"line one   \nline two\n";
        assert!(content_matches(desired, on_disk));
    }

    #[test]
    fn content_matches_detects_real_differences() {
        assert!(!content_matches(b"a", b"b"));
    }

    #[test]
    fn containerd_config_is_deterministic() {
        let a = render_containerd_config("registry.k8s.io/pause:3.9", "/var/lib/containerd");
        let b = render_containerd_config("registry.k8s.io/pause:3.9", "/var/lib/containerd");
        assert_eq!(a, b);
    }
}
