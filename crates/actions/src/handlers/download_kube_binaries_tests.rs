// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::test_context_single_root;

#[tokio::test]
async fn downloads_all_binaries_on_clean_host() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, fakes) = test_context_single_root(dir.path().to_path_buf());
    for binary in REQUIRED_BINARIES {
        fakes.downloader.seed(binary_url(binary, DEFAULT_KUBERNETES_VERSION), b"fake-binary".to_vec());
    }

    let handler = DownloadKubeBinariesHandler;
    let status = handler.apply(&ctx, DownloadKubeBinariesSpec { kubernetes_version: String::new() }).await.unwrap();
    assert_eq!(status.binaries_installed.len(), REQUIRED_BINARIES.len());
    for binary in REQUIRED_BINARIES {
        assert!(ctx.bin_root.join(binary).exists());
    }
}

#[tokio::test]
async fn exact_version_match_skips_redownload() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, fakes) = test_context_single_root(dir.path().to_path_buf());
    for binary in REQUIRED_BINARIES {
        let path = ctx.bin_root.join(binary);
        std::fs::create_dir_all(&ctx.bin_root).unwrap();
        std::fs::write(&path, b"existing").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        fakes.process_runner.script(
            path.to_string_lossy().as_ref(),
            &["version", "--client", "--output=short"],
            nodeagent_adapters::ProcessOutput {
                success: true,
                stdout: format!("v{DEFAULT_KUBERNETES_VERSION}"),
                stderr: String::new(),
            },
        );
    }

    let handler = DownloadKubeBinariesHandler;
    handler.apply(&ctx, DownloadKubeBinariesSpec { kubernetes_version: String::new() }).await.unwrap();
}

#[test]
fn version_match_is_exact_not_prefix() {
    assert!(version_matches_exactly("v1.30.7", "1.30.7"));
    assert!(!version_matches_exactly("v1.30.70", "1.30.7"));
}

#[test]
fn validate_rejects_unparsable_version() {
    let spec = DownloadKubeBinariesSpec { kubernetes_version: "stable".to_string() };
    assert!(spec.validate().is_err());
}
