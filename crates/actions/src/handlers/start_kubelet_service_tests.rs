// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::auth::BootstrapTokenAuth;
use crate::test_support::test_context_single_root;

fn token_spec() -> StartKubeletServiceSpec {
    StartKubeletServiceSpec {
        server: "https://10.0.0.1:6443".to_string(),
        ca_pem: "-----BEGIN CERTIFICATE-----\nfake\n-----END CERTIFICATE-----\n".to_string(),
        node_ip: "10.0.0.5".to_string(),
        extra_args: vec![],
        auth: KubeletAuthVariants {
            bootstrap_token: Some(BootstrapTokenAuth { token: "abcdef.0123456789abcdef".to_string() }),
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn fresh_install_writes_bootstrap_kubeconfig_and_starts() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, fakes) = test_context_single_root(dir.path().to_path_buf());
    let handler = StartKubeletServiceHandler;
    let status = handler.apply(&ctx, token_spec()).await.unwrap();
    assert!(status.ca_written);
    assert!(status.kubeconfig_written);
    assert!(status.restarted);
    assert!(fakes.service_manager.is_active(UNIT_NAME));
    assert!(ctx.host_path(BOOTSTRAP_KUBECONFIG_PATH).exists());
    assert!(!ctx.host_path(KUBELET_KUBECONFIG_PATH).exists());
}

#[tokio::test]
async fn second_pass_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, fakes) = test_context_single_root(dir.path().to_path_buf());
    let handler = StartKubeletServiceHandler;
    handler.apply(&ctx, token_spec()).await.unwrap();
    let status = handler.apply(&ctx, token_spec()).await.unwrap();
    assert!(!status.ca_written);
    assert!(!status.kubeconfig_written);
    assert!(!status.restarted);
    assert_eq!(fakes.service_manager.restart_count(UNIT_NAME), 0);
}

#[test]
fn validate_rejects_http_server() {
    let mut spec = token_spec();
    spec.server = "http://insecure".to_string();
    assert!(spec.validate().is_err());
}

#[test]
fn validate_rejects_no_auth_variant() {
    let mut spec = token_spec();
    spec.auth = KubeletAuthVariants::default();
    assert!(spec.validate().is_err());
}

#[test]
fn redact_clears_bootstrap_token() {
    let mut spec = token_spec();
    spec.redact();
    assert_eq!(spec.auth.bootstrap_token.unwrap().token, nodeagent_core::BOOTSTRAP_TOKEN_REDACTED);
}
