// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nodeagent-daemon: the supervisor process (design §4.7, C7).
//!
//! Owns layered configuration loading, tracing setup, and
//! [`supervisor::DaemonSupervisor`] — the three cooperating periodic loops
//! plus the loopback RPC server, coordinated by the mutex gate so no two
//! mutating flows overlap. `nodeagent-cli` is the only caller: it loads a
//! [`config::Config`], builds a supervisor, and drives `startup()` /
//! `run()` from its `agent` subcommand.

pub mod config;
pub mod error;
pub mod logging;
pub mod supervisor;

pub use config::Config;
pub use error::DaemonError;
pub use logging::{init_tracing, LogFormat};
pub use supervisor::{build_action_context, DaemonSupervisor};
