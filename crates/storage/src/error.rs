// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The snapshot store's own error type (design §4.4). Kept separate from
//! [`nodeagent_core::NodeAgentError`] because only two of its variants
//! (`Io`, `Json`) are ever relevant here; callers convert at the point
//! they need the wider taxonomy.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<StorageError> for nodeagent_core::NodeAgentError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io { path, source } => nodeagent_core::NodeAgentError::io(path, source),
            StorageError::Json { path: _, source } => nodeagent_core::NodeAgentError::Json(source),
        }
    }
}
