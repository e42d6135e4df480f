// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process-wide mutex gate (design §5): a single atomic compare-and-set
//! flag ensuring no two of {bootstrap, unbootstrap, drift remediation} run
//! concurrently. Deliberately not a fair lock — callers that lose the race
//! skip their tick rather than queue behind the holder.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, cloneable handle to the gate's flag.
#[derive(Debug, Clone, Default)]
pub struct MutexGate {
    held: Arc<AtomicBool>,
}

/// Held while a guard is alive; releases the gate on drop regardless of how
/// the holder's operation ends (success, error, or panic-equivalent).
#[derive(Debug)]
pub struct GateGuard {
    held: Arc<AtomicBool>,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::SeqCst);
    }
}

impl MutexGate {
    pub fn new() -> Self {
        Self { held: Arc::new(AtomicBool::new(false)) }
    }

    /// Attempts to acquire the gate. Returns `None` if another holder is
    /// already in flight ("skip this tick", not "wait for this tick").
    pub fn try_acquire(&self) -> Option<GateGuard> {
        self.held
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| GateGuard { held: Arc::clone(&self.held) })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_first_guard_lives() {
        let gate = MutexGate::new();
        let first = gate.try_acquire();
        assert!(first.is_some());
        assert!(gate.try_acquire().is_none());
    }

    #[test]
    fn dropping_the_guard_releases_the_gate() {
        let gate = MutexGate::new();
        {
            let _guard = gate.try_acquire().expect("gate starts free");
        }
        assert!(gate.try_acquire().is_some());
    }
}
