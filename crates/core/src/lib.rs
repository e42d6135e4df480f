// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nodeagent-core: shared types for the node-lifecycle reconciliation core.
//!
//! This crate owns the data model (§3 of the design): action envelopes,
//! snapshot documents, the error taxonomy, and the small set of traits
//! (`Clock`, `Redact`) that every other crate in the workspace builds on.

pub mod actions;
pub mod clock;
pub mod error;
pub mod gate;
pub mod redact;
pub mod snapshot;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use actions::{
    ActionMetadata, ActionName, TypeUrl, BOOTSTRAP_TOKEN_REDACTED, CLIENT_SECRET_REDACTED,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{NodeAgentError, StatusCode};
pub use gate::{GateGuard, MutexGate};
pub use redact::Redact;
pub use snapshot::{
    LastUpdated, ManagedClusterSpec, NodeStatus, ReadyState, RegistrationStatus, StatusReason, StatusSource,
    MANAGED_CLUSTER_SPEC_SCHEMA_VERSION,
};
pub use version::{parse_major_minor, MajorMinor};
