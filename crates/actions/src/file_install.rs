// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared "file install" policy every handler uses: write `contents`
//! to `path` only if it differs from what's already there, atomically via
//! tempfile-then-rename, mirroring the snapshot store's write discipline
//! (design §4.4) but for arbitrary rendered config/unit files.

use nodeagent_core::NodeAgentError;
use std::path::Path;

/// Writes `contents` to `path` with `mode` if the file is absent or its
/// contents differ; returns whether a write happened. Parent directories
/// are created as needed.
pub fn ensure_file(path: &Path, contents: &[u8], mode: u32) -> Result<bool, NodeAgentError> {
    if let Ok(existing) = std::fs::read(path) {
        if existing == contents {
            return Ok(false);
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| NodeAgentError::io(parent, e))?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    write_atomic(&tmp_path, path, contents, mode)?;
    Ok(true)
}

fn write_atomic(tmp_path: &Path, dest: &Path, contents: &[u8], mode: u32) -> Result<(), NodeAgentError> {
    use std::io::Write;
    {
        let mut file = std::fs::File::create(tmp_path).map_err(|e| NodeAgentError::io(tmp_path, e))?;
        file.write_all(contents).map_err(|e| NodeAgentError::io(tmp_path, e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(mode))
                .map_err(|e| NodeAgentError::io(tmp_path, e))?;
        }
    }
    std::fs::rename(tmp_path, dest).map_err(|e| NodeAgentError::io(dest, e))
}

/// `true` if `path` exists and is executable (used by the "version check"
/// policy before even attempting a `--version` probe).
pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).map(|m| m.permissions().mode() & 0o111 != 0).unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.exists()
    }
}
