// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::test_context_single_root;
use std::io::Write;

fn make_tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    let tar_bytes = builder.into_inner().unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar_bytes).unwrap();
    encoder.finish().unwrap()
}

#[tokio::test]
async fn downloads_binary_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, fakes) = test_context_single_root(dir.path().to_path_buf());
    fakes.downloader.seed(npd_archive_url(DEFAULT_NPD_VERSION), make_tar_gz(&[(BINARY_NAME, b"npd-bytes")]));

    let handler = DownloadNodeProblemDetectorHandler;
    let status = handler
        .apply(&ctx, DownloadNodeProblemDetectorSpec { npd_version: String::new() })
        .await
        .unwrap();
    assert!(status.downloaded);
    assert!(ctx.bin_root.join(BINARY_NAME).exists());
}

#[tokio::test]
async fn second_pass_skips_redownload_when_version_matches() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, fakes) = test_context_single_root(dir.path().to_path_buf());
    fakes.downloader.seed(npd_archive_url(DEFAULT_NPD_VERSION), make_tar_gz(&[(BINARY_NAME, b"npd-bytes")]));
    fakes.process_runner.script_version(ctx.bin_root.join(BINARY_NAME).to_string_lossy().as_ref(), DEFAULT_NPD_VERSION);

    let handler = DownloadNodeProblemDetectorHandler;
    handler.apply(&ctx, DownloadNodeProblemDetectorSpec { npd_version: String::new() }).await.unwrap();
    let status = handler
        .apply(&ctx, DownloadNodeProblemDetectorSpec { npd_version: String::new() })
        .await
        .unwrap();
    assert!(!status.downloaded);
}

#[test]
fn validate_rejects_unparsable_version() {
    let spec = DownloadNodeProblemDetectorSpec { npd_version: "not-a-version".to_string() };
    assert!(spec.validate().is_err());
}
