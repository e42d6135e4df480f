// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The crate-wide error taxonomy.
//!
//! Every fallible operation in the reconciliation core eventually returns a
//! [`NodeAgentError`]. Each variant carries an RPC-style [`StatusCode`] and a
//! process exit code so a CLI entry point can translate failures into
//! `std::process::exit` without matching error strings.

use std::path::PathBuf;

use thiserror::Error;

/// RPC-style status codes returned across the dispatch bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    InvalidArgument,
    Internal,
}

/// The crate-wide error taxonomy.
#[derive(Debug, Error)]
pub enum NodeAgentError {
    /// Malformed spec, unknown action type, unparsable version.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A download exceeded the configured size cap.
    #[error("file too large: {0}")]
    FileTooLarge(String),

    /// A systemd unit lookup found no unit by that name.
    ///
    /// Never surfaced across a handler boundary: handlers convert this into
    /// a state-machine transition (NotInstalled vs a real dbus failure).
    #[error("unit not found: {0}")]
    UnitNotFound(String),

    /// Two detector findings requested different non-unspecified actions.
    #[error("conflicting remediation actions: {0} vs {1}")]
    ConflictingAction(String, String),

    /// Two detector findings requested the same action with different versions.
    #[error("conflicting remediation versions for {action}: {a} vs {b}")]
    ConflictingVersion { action: String, a: String, b: String },

    /// Timeouts, cancellation, or a dependency not yet reachable. Retried at
    /// the next periodic tick; never crashes the daemon.
    #[error("transient error: {0}")]
    Transient(String),

    /// Unrecoverable startup condition (e.g. the snapshot directory cannot be
    /// created). Aborts the daemon.
    #[error("fatal error: {0}")]
    Fatal(String),

    /// A host operation (process execution, filesystem, systemd) failed.
    #[error("internal error: {0}")]
    Internal(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NodeAgentError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// The RPC-style status code returned across the dispatch bus.
    pub fn status_code(&self) -> StatusCode {
        match self {
            NodeAgentError::InvalidArgument(_) => StatusCode::InvalidArgument,
            _ => StatusCode::Internal,
        }
    }

    /// The process exit code a CLI entry point should use for this error.
    ///
    /// Mirrors common `sysexits.h` conventions: 2 for bad arguments, 70 for
    /// internal/software faults, 75 for conditions a retry might resolve.
    pub fn exit_code(&self) -> i32 {
        match self {
            NodeAgentError::InvalidArgument(_) => 2,
            NodeAgentError::Transient(_) => 75,
            NodeAgentError::Fatal(_) => 70,
            _ => 1,
        }
    }

    /// True for errors a periodic loop should retry rather than propagate.
    pub fn is_transient(&self) -> bool {
        matches!(self, NodeAgentError::Transient(_))
    }
}
