// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nodeagent-adapters: trait seams for every out-of-core collaborator
//! named in design §1 (container-runtime/CNI/kube binary download,
//! systemd D-Bus, process execution, kubelet readiness, the kubelet
//! exec-plugin self-invocation). Every trait here has a real backend and,
//! behind `#[cfg(any(test, feature = "test-support"))]`, a fake backend
//! other crates' test suites build on without duplicating test doubles.

pub mod archive;
pub mod credential_exec;
pub mod downloader;
pub mod error;
pub mod process;
pub mod ready_probe;
pub mod service_manager;

#[cfg(any(test, feature = "test-support"))]
pub mod fakes;

pub use archive::{extract_tar_gz, ArchiveError};
pub use credential_exec::{CredentialExecPlugin, ExecAuthMethod, SelfExecPlugin};
pub use downloader::{Downloader, HttpDownloader};
pub use error::AdapterError;
pub use process::{OsProcessRunner, ProcessOutput, ProcessRunner};
pub use ready_probe::{HttpReadyProbe, ReadyProbe};
pub use service_manager::{SystemdServiceManager, UnitState, ServiceManager};
