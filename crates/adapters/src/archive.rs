// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gzip-wrapped TAR extraction with path-traversal rejection (design
//! §4.2). Every downloaded archive passes through here before any file
//! lands on disk: entry names are sanitized, only regular files are
//! written, and the decompressed stream is bounded so a hostile or
//! corrupt payload cannot exhaust disk space.

use flate2::read::GzDecoder;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use thiserror::Error;

/// Streamed downloads are bounded at 1 GiB (design §4.2).
pub const MAX_ARCHIVE_BYTES: u64 = 1024 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("unsafe archive entry path: {0}")]
    UnsafePath(String),

    #[error("archive exceeded {limit} byte cap")]
    TooLarge { limit: u64 },

    #[error("archive io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ArchiveError> for nodeagent_core::NodeAgentError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::TooLarge { limit } => {
                nodeagent_core::NodeAgentError::FileTooLarge(format!("exceeded {limit} byte cap"))
            }
            ArchiveError::UnsafePath(path) => {
                nodeagent_core::NodeAgentError::InvalidArgument(format!("unsafe archive entry path: {path}"))
            }
            other => nodeagent_core::NodeAgentError::Internal(other.to_string()),
        }
    }
}

/// Reject path traversal: the cleaned path must be relative, must not equal
/// `.` or `..`, and must not start with a parent-dir component.
fn sanitize_entry_path(raw: &Path) -> Result<PathBuf, ArchiveError> {
    let raw_str = raw.to_string_lossy();

    let mut cleaned = PathBuf::new();
    for component in raw.components() {
        match component {
            Component::Normal(part) => cleaned.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ArchiveError::UnsafePath(raw_str.to_string()));
            }
        }
    }

    if cleaned.as_os_str().is_empty() {
        return Err(ArchiveError::UnsafePath(raw_str.to_string()));
    }
    Ok(cleaned)
}

/// Extract a gzip-wrapped TAR byte buffer under `dest_root`, rejecting
/// traversal and enforcing `max_bytes` on the decompressed stream.
///
/// Only regular files are written; directories implied by entry paths are
/// created with `create_dir_all`. Returns the list of relative paths
/// extracted, in archive order.
pub fn extract_tar_gz(
    bytes: &[u8],
    dest_root: &Path,
    max_bytes: u64,
) -> Result<Vec<PathBuf>, ArchiveError> {
    if bytes.len() as u64 > max_bytes {
        return Err(ArchiveError::TooLarge { limit: max_bytes });
    }

    let decoder = GzDecoder::new(bytes);
    let mut bounded = BoundedReader { inner: decoder, remaining: max_bytes };
    let mut archive = Archive::new(&mut bounded);
    let mut written = Vec::new();

    std::fs::create_dir_all(dest_root)?;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();

        if !entry.header().entry_type().is_file() {
            continue;
        }

        let relative = sanitize_entry_path(&entry_path)?;
        let dest = dest_root.join(&relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut tmp_name = dest.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = dest.with_file_name(tmp_name);
        let mut out = std::fs::File::create(&tmp)?;
        std::io::copy(&mut entry, &mut out)?;
        std::fs::rename(&tmp, &dest)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = entry.header().mode().unwrap_or(0o755);
            std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(mode))?;
        }

        written.push(relative);
    }

    Ok(written)
}

/// Wraps a reader and errors once more than `remaining` bytes are read,
/// so an archive that decompresses past the cap fails mid-stream rather
/// than after fully buffering.
struct BoundedReader<R> {
    inner: R,
    remaining: u64,
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n as u64 > self.remaining {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("archive exceeded {} byte cap", self.remaining),
            ));
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}
