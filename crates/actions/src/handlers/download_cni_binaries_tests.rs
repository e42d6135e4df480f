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
async fn downloads_all_required_plugins_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, _fakes) = test_context_single_root(dir.path().to_path_buf());
    let entries: Vec<(&str, &[u8])> = REQUIRED_PLUGINS.iter().map(|p| (*p, b"plugin-bytes".as_slice())).collect();
    _fakes.downloader.seed(cni_archive_url(DEFAULT_CNI_VERSION), make_tar_gz(&entries));

    let handler = DownloadCniBinariesHandler;
    let status = handler.apply(&ctx, DownloadCniBinariesSpec { cni_plugins_version: String::new() }).await.unwrap();
    assert_eq!(status.plugins_installed.len(), REQUIRED_PLUGINS.len());
    for plugin in REQUIRED_PLUGINS {
        assert!(ctx.cni_bin_root.join(plugin).exists());
    }
}

#[test]
fn defaulting_is_idempotent() {
    let spec = DownloadCniBinariesSpec { cni_plugins_version: String::new() }.defaulting();
    assert_eq!(spec.clone().defaulting(), spec);
}
