// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic JSON read/write of the two on-disk snapshot documents (design
//! §4.4, C4): node-status and managed-cluster-spec. Write path is
//! tempfile-then-rename so a reader never observes a partial document;
//! remove and mark operations are best-effort (a missing file is not an
//! error).

use crate::error::StorageError;
use chrono::{DateTime, Utc};
use nodeagent_core::{ManagedClusterSpec, NodeStatus};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Write `value` to `path` as indented JSON via write-tempfile-then-rename:
/// ensure the parent directory (mode 0750), marshal JSON with a 2-space
/// indent, write to `path.tmp` (mode 0600), then rename onto `path`. Rename
/// is atomic on a single filesystem, so a concurrent reader only ever sees
/// the previous full document or the new full document.
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| StorageError::Io { path: parent.to_path_buf(), source })?;
        #[cfg(unix)]
        set_mode(parent, 0o750).map_err(|source| StorageError::Io { path: parent.to_path_buf(), source })?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Json { path: path.to_path_buf(), source })?;
    {
        let mut file =
            std::fs::File::create(&tmp_path).map_err(|source| StorageError::Io { path: tmp_path.clone(), source })?;
        file.write_all(&bytes).map_err(|source| StorageError::Io { path: tmp_path.clone(), source })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(|source| StorageError::Io { path: tmp_path.clone(), source })?;
        }
        file.sync_all().map_err(|source| StorageError::Io { path: tmp_path.clone(), source })?;
    }

    std::fs::rename(&tmp_path, path).map_err(|source| StorageError::Io { path: path.to_path_buf(), source })
}

/// Plain `open+read+unmarshal`. A missing file is not an error: it reads as
/// `Ok(None)`, matching the "absent snapshot" convention every caller in
/// this crate relies on.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let value = serde_json::from_str(&contents)
                .map_err(|source| StorageError::Json { path: path.to_path_buf(), source })?;
            Ok(Some(value))
        }
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StorageError::Io { path: path.to_path_buf(), source }),
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

fn remove_best_effort(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "snapshot store: failed to remove file");
        }
    }
}

/// `writeStatus`/`loadStatus`/`writeSpec`/`loadSpec`/`removeStatus`/
/// `removeSpec`/`markKubeletUnhealthy` (design §4.4, C4). Stateless: every
/// method takes the path it operates on, so callers own path selection
/// (runtime dir vs. temp-dir fallback — see `Config`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotStore;

impl SnapshotStore {
    pub fn new() -> Self {
        Self
    }

    pub fn write_status(&self, path: &Path, status: &NodeStatus) -> Result<(), StorageError> {
        write_json(path, status)
    }

    pub fn load_status(&self, path: &Path) -> Result<Option<NodeStatus>, StorageError> {
        read_json(path)
    }

    pub fn write_spec(&self, path: &Path, spec: &ManagedClusterSpec) -> Result<(), StorageError> {
        write_json(path, spec)
    }

    pub fn load_spec(&self, path: &Path) -> Result<Option<ManagedClusterSpec>, StorageError> {
        read_json(path)
    }

    pub fn remove_status(&self, path: &Path) {
        remove_best_effort(path);
    }

    pub fn remove_spec(&self, path: &Path) {
        remove_best_effort(path);
    }

    /// Loads the current status (or starts from [`NodeStatus::empty`]),
    /// forces the kubelet fields unhealthy, and writes atomically (design
    /// §4.4). Best-effort: a write failure is logged, not propagated — the
    /// caller (drift engine, on remediation failure) must not itself fail
    /// because the health marker couldn't be written.
    pub fn mark_kubelet_unhealthy(&self, path: &Path, now: DateTime<Utc>, agent_version: &str) {
        let mut status = match self.load_status(path) {
            Ok(Some(status)) => status,
            Ok(None) => NodeStatus::empty(now, agent_version),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "snapshot store: failed to load status before marking unhealthy, starting from empty");
                NodeStatus::empty(now, agent_version)
            }
        };
        status.mark_kubelet_unhealthy(now);
        if let Err(e) = self.write_status(path, &status) {
            warn!(path = %path.display(), error = %e, "snapshot store: failed to write unhealthy status");
        }
    }
}
