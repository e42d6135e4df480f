// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `redact()` contract shared by every action spec/status/result type
//! (design §4.1): idempotent, `redact(redact(x)) == redact(x)`. Every
//! action message implements this trait so the dispatch bus (C1) can clear
//! secret-bearing fields before a response crosses any boundary — logging,
//! the in-process channel, or the loopback RPC transport.

/// Clears secret-bearing fields in place.
pub trait Redact {
    fn redact(&mut self);
}

/// Placeholder written into a redacted bootstrap-token field.
pub const BOOTSTRAP_TOKEN_REDACTED: &str = "***redacted-bootstrap-token***";

/// Placeholder written into a redacted service-principal client-secret field.
pub const CLIENT_SECRET_REDACTED: &str = "***redacted-client-secret***";
