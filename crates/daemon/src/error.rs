// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon-level error type: wraps configuration failures and the
//! action-taxonomy errors the periodic loops surface, keeping one
//! `exit_code()` mapping for `main` to apply.

use crate::config::ConfigError;
use nodeagent_core::NodeAgentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    NodeAgent(#[from] NodeAgentError),
}

impl DaemonError {
    /// The process exit code `main` should use.
    pub fn exit_code(&self) -> i32 {
        match self {
            DaemonError::Config(ConfigError::RuntimeDirNotCreatable { .. }) => NodeAgentError::Fatal(String::new()).exit_code(),
            DaemonError::Config(_) => NodeAgentError::InvalidArgument(String::new()).exit_code(),
            DaemonError::NodeAgent(err) => err.exit_code(),
        }
    }
}
