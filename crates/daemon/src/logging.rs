// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup: the daemon emits newline-delimited JSON so a log shipper
//! can parse it, while the CLI's own invocations use a compact
//! human-readable formatter. Both read the `NODEAGENT_LOG` filter
//! directive, defaulting to `info`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Newline-delimited JSON, one object per event. Used by the `agent`
    /// subcommand running as a supervised daemon.
    Json,
    /// Compact single-line-per-event output for an attached terminal.
    Compact,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("NODEAGENT_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global tracing subscriber. Idempotent only in the sense
/// that it should be called exactly once per process; a second call
/// returns an error from `tracing`'s global dispatcher and is a bug in the
/// caller, not something this function guards against.
pub fn init_tracing(format: LogFormat) {
    let registry = tracing_subscriber::registry().with(env_filter());
    match format {
        LogFormat::Json => registry.with(fmt::layer().json().with_current_span(false)).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact().with_target(false)).init(),
    }
}
