// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three canonical step lists (design §4.3): [`full_bootstrap`],
//! [`upgrade_remediation`], and [`unbootstrap`]. Each returns an ordered
//! [`Vec<PlanStep>`] the [`crate::executor::BootstrapExecutor`] runs
//! strictly in sequence.

use nodeagent_actions::auth::KubeletAuthVariants;
use nodeagent_actions::handlers::{
    ConfigureBaseOsSpec, ConfigureCniHandler, ConfigureCniSpec, DownloadCniBinariesHandler, DownloadCniBinariesSpec,
    DownloadCriBinariesHandler, DownloadCriBinariesSpec, DownloadKubeBinariesHandler, DownloadKubeBinariesSpec,
    DownloadNodeProblemDetectorHandler, DownloadNodeProblemDetectorSpec, KubeadmNodeJoinHandler, KubeadmNodeJoinSpec,
    StartContainerdServiceHandler, StartContainerdServiceSpec, StartKubeletServiceHandler, StartKubeletServiceSpec,
    StartNodeProblemDetectorHandler, StartNodeProblemDetectorSpec,
};
use nodeagent_actions::handler::ActionHandler;
use nodeagent_bus::ActionEnvelope;
use nodeagent_core::ActionMetadata;
use serde::{Deserialize, Serialize};

/// Unit name for kubelet, shared by the plan builders and the executor's
/// `ServiceStop`/`ServiceRestart` steps.
pub const KUBELET_UNIT: &str = "kubelet.service";

#[derive(Debug, Clone)]
pub enum StepKind {
    Dispatch(ActionEnvelope),
    ServiceStop(String),
    ServiceRestart(String),
    NoOp,
}

#[derive(Debug, Clone)]
pub struct PlanStep {
    pub name: String,
    pub kind: StepKind,
}

impl PlanStep {
    pub fn dispatch(name: &str, metadata: ActionMetadata, spec: serde_json::Value) -> Self {
        Self { name: name.to_string(), kind: StepKind::Dispatch(ActionEnvelope::new(metadata, spec)) }
    }
}

fn envelope_json<T: serde::Serialize>(type_url: nodeagent_core::TypeUrl, name: &str, spec: &T) -> PlanStep {
    let metadata = ActionMetadata::new(type_url, name);
    // `serde_json::to_value` on these spec types cannot fail: every field is
    // a plain owned value, never a map key requiring stringification.
    let value = serde_json::to_value(spec).unwrap_or(serde_json::Value::Null);
    PlanStep::dispatch(name, metadata, value)
}

/// Parameters for one kubelet start, shared by [`full_bootstrap`] and
/// [`upgrade_remediation`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubeletParams {
    pub server: String,
    pub ca_pem: String,
    pub node_ip: String,
    pub extra_args: Vec<String>,
    pub auth: KubeletAuthVariants,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubeadmJoinParams {
    pub cluster_endpoint: String,
    pub token: String,
    pub discovery_token_ca_cert_hash: String,
    pub node_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpdParams {
    pub npd_version: String,
    pub kubelet_log_path: String,
}

/// Every parameter the full bootstrap plan needs (design §4.3), as
/// provisioned out-of-band and persisted at `bootstrap-params.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapParams {
    pub packages: Vec<String>,
    pub containerd_version: String,
    pub runc_version: String,
    pub sandbox_image: String,
    pub runtime_root: String,
    pub gpu_runtime: bool,
    pub cni_plugins_version: String,
    pub cni_spec_version: String,
    pub kubernetes_version: String,
    pub kubelet: KubeletParams,
    pub join: KubeadmJoinParams,
    pub npd: NpdParams,
}

/// Parameters for a low-disruption Kubernetes-version remediation: only
/// the kubelet binaries and unit are refreshed, the rest of the node is
/// left untouched (design §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubernetesUpgradeParams {
    pub kubernetes_version: String,
    pub kubelet: KubeletParams,
}

fn kubelet_spec(kubelet: &KubeletParams) -> StartKubeletServiceSpec {
    StartKubeletServiceSpec {
        server: kubelet.server.clone(),
        ca_pem: kubelet.ca_pem.clone(),
        node_ip: kubelet.node_ip.clone(),
        extra_args: kubelet.extra_args.clone(),
        auth: kubelet.auth.clone(),
    }
}

/// Full bootstrap (design §4.3): provision the host, download every
/// binary the node needs, configure CNI and bring up the container
/// runtime, fetch and start kubelet, join the cluster, then start
/// node-problem detector. Follows the canonical
/// configure/download/start grouping, with `configure-cni` and
/// `kubeadm-join` (not named in the canonical list) placed immediately
/// before the step each depends on.
pub fn full_bootstrap(params: &BootstrapParams) -> Vec<PlanStep> {
    vec![
        envelope_json(
            nodeagent_actions::handlers::ConfigureBaseOsHandler::type_url(),
            "configure-os",
            &ConfigureBaseOsSpec { packages: params.packages.clone() },
        ),
        envelope_json(
            DownloadCniBinariesHandler::type_url(),
            "download-cni",
            &DownloadCniBinariesSpec { cni_plugins_version: params.cni_plugins_version.clone() },
        ),
        envelope_json(
            DownloadCriBinariesHandler::type_url(),
            "download-cri",
            &DownloadCriBinariesSpec {
                containerd_version: params.containerd_version.clone(),
                runc_version: params.runc_version.clone(),
            },
        ),
        envelope_json(
            DownloadKubeBinariesHandler::type_url(),
            "download-kube",
            &DownloadKubeBinariesSpec { kubernetes_version: params.kubernetes_version.clone() },
        ),
        envelope_json(
            DownloadNodeProblemDetectorHandler::type_url(),
            "download-npd",
            &DownloadNodeProblemDetectorSpec { npd_version: params.npd.npd_version.clone() },
        ),
        envelope_json(
            ConfigureCniHandler::type_url(),
            "configure-cni",
            &ConfigureCniSpec { cni_spec_version: params.cni_spec_version.clone() },
        ),
        envelope_json(
            StartContainerdServiceHandler::type_url(),
            "start-containerd",
            &StartContainerdServiceSpec {
                sandbox_image: params.sandbox_image.clone(),
                runtime_root: params.runtime_root.clone(),
                gpu_runtime: params.gpu_runtime,
            },
        ),
        envelope_json(StartKubeletServiceHandler::type_url(), "start-kubelet", &kubelet_spec(&params.kubelet)),
        envelope_json(
            KubeadmNodeJoinHandler::type_url(),
            "kubeadm-join",
            &KubeadmNodeJoinSpec {
                cluster_endpoint: params.join.cluster_endpoint.clone(),
                token: params.join.token.clone(),
                discovery_token_ca_cert_hash: params.join.discovery_token_ca_cert_hash.clone(),
                node_name: params.join.node_name.clone(),
            },
        ),
        envelope_json(
            StartNodeProblemDetectorHandler::type_url(),
            "start-npd",
            &StartNodeProblemDetectorSpec { kubelet_log_path: params.npd.kubelet_log_path.clone() },
        ),
    ]
}

/// Low-disruption Kubernetes-upgrade remediation (design §4.6): only
/// refetch kubelet binaries, rewrite its unit/config, and restart the
/// service. Containerd, CNI, and cluster membership are left untouched.
pub fn upgrade_remediation(params: &KubernetesUpgradeParams) -> Vec<PlanStep> {
    vec![
        PlanStep { name: "stop-kubelet-for-upgrade".to_string(), kind: StepKind::ServiceStop(KUBELET_UNIT.to_string()) },
        envelope_json(
            DownloadKubeBinariesHandler::type_url(),
            "download-kube",
            &DownloadKubeBinariesSpec { kubernetes_version: params.kubernetes_version.clone() },
        ),
        envelope_json(StartKubeletServiceHandler::type_url(), "reconfigure-kubelet", &kubelet_spec(&params.kubelet)),
        PlanStep { name: "start-kubelet-only".to_string(), kind: StepKind::ServiceRestart(KUBELET_UNIT.to_string()) },
    ]
}

/// Unbootstrap: stop the kubelet and container runtime services, then
/// walk the installed state back off in reverse bootstrap order. Removal
/// handlers are not implemented (design Non-goals); those steps are
/// recorded as no-ops so the plan shape documents the intended order.
pub fn unbootstrap() -> Vec<PlanStep> {
    vec![
        PlanStep {
            name: "stop-npd".to_string(),
            kind: StepKind::ServiceStop("node-problem-detector.service".to_string()),
        },
        PlanStep { name: "stop-kubelet".to_string(), kind: StepKind::ServiceStop(KUBELET_UNIT.to_string()) },
        PlanStep { name: "stop-containerd".to_string(), kind: StepKind::ServiceStop("containerd.service".to_string()) },
        PlanStep { name: "remove-kube".to_string(), kind: StepKind::NoOp },
        PlanStep { name: "remove-npd".to_string(), kind: StepKind::NoOp },
        PlanStep { name: "remove-cni".to_string(), kind: StepKind::NoOp },
        PlanStep { name: "remove-cri".to_string(), kind: StepKind::NoOp },
        PlanStep { name: "unconfigure-os".to_string(), kind: StepKind::NoOp },
    ]
}
