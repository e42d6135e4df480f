//! `nodeagent token kubelogin` specs: the kubelet credential-exec plugin
//! entry point. Minting a real credential needs an external cloud-provider
//! broker this build doesn't ship, so every path here ends in a reported
//! error rather than an `ExecCredential` on stdout.

use crate::support::{AssertStdioExt, Fixture, OutputAssertExt};

#[test]
fn missing_auth_method_is_an_invalid_argument() {
    let fixture = Fixture::new();
    fixture
        .nodeagent()
        .args(["token", "kubelogin"])
        .fails()
        .stdout_has("missing required environment variable NODEAGENT_AUTH_METHOD");
}

#[test]
fn missing_client_id_is_an_invalid_argument() {
    let fixture = Fixture::new();
    fixture
        .nodeagent()
        .env("NODEAGENT_AUTH_METHOD", "workload-identity")
        .args(["token", "kubelogin"])
        .fails()
        .stdout_has("missing required environment variable NODEAGENT_CLIENT_ID");
}

#[test]
fn fully_configured_invocation_reports_no_credential_broker() {
    let fixture = Fixture::new();
    fixture
        .nodeagent()
        .env("NODEAGENT_AUTH_METHOD", "workload-identity")
        .env("NODEAGENT_TENANT_ID", "tenant-1")
        .env("NODEAGENT_CLIENT_ID", "client-1")
        .args(["token", "kubelogin"])
        .fails()
        .stdout_has("no cloud-provider credential broker is configured");
}
