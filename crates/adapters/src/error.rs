// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error type every adapter trait returns, convertible into the
//! crate-wide `NodeAgentError` taxonomy at the action-handler boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("download failed: {0}")]
    Download(String),

    #[error("download exceeded size cap of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("process execution failed: {0}")]
    Process(String),

    #[error("systemd operation failed: {0}")]
    Systemd(String),

    #[error("unit not found: {0}")]
    UnitNotFound(String),

    #[error("cancelled")]
    Cancelled,
}

impl From<AdapterError> for nodeagent_core::NodeAgentError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::TooLarge { limit } => {
                nodeagent_core::NodeAgentError::FileTooLarge(format!(
                    "exceeded {limit} byte cap"
                ))
            }
            AdapterError::UnitNotFound(unit) => nodeagent_core::NodeAgentError::UnitNotFound(unit),
            AdapterError::Cancelled => {
                nodeagent_core::NodeAgentError::Transient("operation cancelled".to_string())
            }
            other => nodeagent_core::NodeAgentError::Internal(other.to_string()),
        }
    }
}
