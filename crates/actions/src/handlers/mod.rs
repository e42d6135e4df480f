// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-concern action handlers (design §4.2, handler table). One module per
//! row, registered centrally by `nodeagent-bus`'s `registry::build()`.

pub mod configure_base_os;
pub mod configure_cni;
pub mod download_cni_binaries;
pub mod download_cri_binaries;
pub mod download_kube_binaries;
pub mod download_node_problem_detector;
pub mod kubeadm_node_join;
pub mod start_containerd_service;
pub mod start_kubelet_service;
pub mod start_node_problem_detector;

pub use configure_base_os::{ConfigureBaseOsHandler, ConfigureBaseOsSpec, ConfigureBaseOsStatus};
pub use configure_cni::{ConfigureCniHandler, ConfigureCniSpec, ConfigureCniStatus};
pub use download_cni_binaries::{DownloadCniBinariesHandler, DownloadCniBinariesSpec, DownloadCniBinariesStatus};
pub use download_cri_binaries::{DownloadCriBinariesHandler, DownloadCriBinariesSpec, DownloadCriBinariesStatus};
pub use download_kube_binaries::{DownloadKubeBinariesHandler, DownloadKubeBinariesSpec, DownloadKubeBinariesStatus};
pub use download_node_problem_detector::{
    DownloadNodeProblemDetectorHandler, DownloadNodeProblemDetectorSpec, DownloadNodeProblemDetectorStatus,
};
pub use kubeadm_node_join::{KubeadmNodeJoinHandler, KubeadmNodeJoinSpec, KubeadmNodeJoinStatus};
pub use start_containerd_service::{StartContainerdServiceHandler, StartContainerdServiceSpec, StartContainerdServiceStatus};
pub use start_kubelet_service::{StartKubeletServiceHandler, StartKubeletServiceSpec, StartKubeletServiceStatus};
pub use start_node_problem_detector::{
    StartNodeProblemDetectorHandler, StartNodeProblemDetectorSpec, StartNodeProblemDetectorStatus,
};
