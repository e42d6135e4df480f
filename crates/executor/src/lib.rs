// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nodeagent-executor: the bootstrap executor (design §4.3, C3).
//!
//! Builds the three canonical step lists ([`plan::full_bootstrap`],
//! [`plan::upgrade_remediation`], [`plan::unbootstrap`]) and runs them
//! strictly sequentially through a [`nodeagent_bus::Dispatcher`] via
//! [`executor::BootstrapExecutor`], recording a composite
//! [`result::ExecutionResult`].

pub mod executor;
pub mod plan;
pub mod result;

pub use executor::{BootstrapExecutor, FailurePolicy};
pub use result::{ExecutionResult, StepOutcome};
