// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nodeagent-status: the status collector (design §4.5, C5).
//!
//! Gathers current host facts (binary versions, service active/ready
//! states, agent metadata) into a [`nodeagent_core::NodeStatus`] snapshot
//! value; the caller (`nodeagent-daemon`) is responsible for persisting it
//! via `nodeagent-storage` and for loading the persisted snapshot back to
//! evaluate [`needs_bootstrap`].

pub mod collector;
pub mod needs_bootstrap;

pub use collector::StatusCollector;
pub use needs_bootstrap::needs_bootstrap;
