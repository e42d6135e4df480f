// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nodeagent-drift: the drift detection and remediation engine (design
//! §4.6, C6). Loads the two persisted snapshots, runs the registered
//! [`Detector`]s, collapses their findings into one [`RemediationPlan`],
//! and dispatches it through the bootstrap executor under the shared
//! mutex gate.

pub mod detector;
pub mod engine;
pub mod finding;
pub mod plan;

pub use detector::{Detector, KubernetesVersionDetector};
pub use engine::{DriftEngine, DriftOutcome};
pub use finding::{Finding, Remediation, RemediationAction};
pub use plan::{resolve_plan, RemediationPlan};
