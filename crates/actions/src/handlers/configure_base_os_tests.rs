// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::test_context_single_root;

#[tokio::test]
async fn installs_default_packages_and_applies_sysctl() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, fakes) = test_context_single_root(dir.path().to_path_buf());
    for pkg in DEFAULT_PACKAGES {
        fakes.process_runner.script(
            "apt-get",
            &["install", "-y", pkg],
            nodeagent_adapters::ProcessOutput { success: true, stdout: String::new(), stderr: String::new() },
        );
    }
    fakes.process_runner.script(
        "sysctl",
        &["--system"],
        nodeagent_adapters::ProcessOutput { success: true, stdout: String::new(), stderr: String::new() },
    );

    let handler = ConfigureBaseOsHandler;
    let status = handler.apply(&ctx, ConfigureBaseOsSpec { packages: vec![] }).await.unwrap();
    assert_eq!(status.packages_installed.len(), DEFAULT_PACKAGES.len());
    assert!(status.sysctl_applied);
    assert!(ctx.host_path(SYSCTL_PATH).exists());
}

#[tokio::test]
async fn second_pass_performs_no_additional_writes() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, fakes) = test_context_single_root(dir.path().to_path_buf());
    for pkg in DEFAULT_PACKAGES {
        fakes.process_runner.script(
            "apt-get",
            &["install", "-y", pkg],
            nodeagent_adapters::ProcessOutput { success: true, stdout: String::new(), stderr: String::new() },
        );
    }
    fakes.process_runner.script(
        "sysctl",
        &["--system"],
        nodeagent_adapters::ProcessOutput { success: true, stdout: String::new(), stderr: String::new() },
    );

    let handler = ConfigureBaseOsHandler;
    handler.apply(&ctx, ConfigureBaseOsSpec { packages: vec![] }).await.unwrap();
    let contents_after_first = std::fs::read(ctx.host_path(SYSCTL_PATH)).unwrap();
    handler.apply(&ctx, ConfigureBaseOsSpec { packages: vec![] }).await.unwrap();
    let contents_after_second = std::fs::read(ctx.host_path(SYSCTL_PATH)).unwrap();
    assert_eq!(contents_after_first, contents_after_second);
}

#[test]
fn defaulting_is_idempotent() {
    let spec = ConfigureBaseOsSpec { packages: vec![] }.defaulting();
    assert_eq!(spec.clone().defaulting(), spec);
}

#[test]
fn validate_rejects_empty_package_name() {
    let spec = ConfigureBaseOsSpec { packages: vec![String::new()] };
    assert!(spec.validate().is_err());
}
