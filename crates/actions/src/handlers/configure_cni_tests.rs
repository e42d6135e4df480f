// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::test_context_single_root;

#[tokio::test]
async fn first_apply_writes_config_second_is_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, _fakes) = test_context_single_root(dir.path().to_path_buf());
    let handler = ConfigureCniHandler;
    let spec = ConfigureCniSpec { cni_spec_version: String::new() };
    let first = handler.apply(&ctx, spec.clone()).await.unwrap();
    assert!(first.config_changed);
    let second = handler.apply(&ctx, spec).await.unwrap();
    assert!(!second.config_changed);
}

#[test]
fn validate_rejects_empty_spec_version() {
    let spec = ConfigureCniSpec { cni_spec_version: String::new() };
    assert!(spec.validate().is_err());
}
