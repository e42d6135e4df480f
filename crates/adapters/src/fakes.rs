// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake implementations of every adapter trait, gated behind
//! `#[cfg(any(test, feature = "test-support"))]`, so other crates' test
//! suites (actions, status, daemon) build on a single shared set of test
//! doubles instead of duplicating them per crate.

use crate::downloader::Downloader;
use crate::error::AdapterError;
use crate::process::{ProcessOutput, ProcessRunner};
use crate::ready_probe::ReadyProbe;
use crate::service_manager::{ServiceManager, UnitState};
use async_trait::async_trait;
use nodeagent_core::ReadyState;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Seeded URL -> bytes map. A `download` for an unseeded URL errors, matching
/// a misconfigured or unreachable download source.
#[derive(Clone, Default)]
pub struct FakeDownloader {
    payloads: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, url: impl Into<String>, bytes: Vec<u8>) {
        self.payloads.lock().insert(url.into(), bytes);
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(&self, url: &str, max_bytes: u64) -> Result<Vec<u8>, AdapterError> {
        let bytes = self
            .payloads
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| AdapterError::Download(format!("no fake payload for {url}")))?;
        if bytes.len() as u64 > max_bytes {
            return Err(AdapterError::TooLarge { limit: max_bytes });
        }
        Ok(bytes)
    }
}

/// Scripted process runner: maps `(program, args)` to a canned output.
/// Unregistered invocations fail as "not found" by default, matching a
/// clean host with nothing installed.
#[derive(Clone, Default)]
pub struct FakeProcessRunner {
    scripts: Arc<Mutex<HashMap<(String, Vec<String>), ProcessOutput>>>,
}

impl FakeProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, program: &str, args: &[&str], output: ProcessOutput) {
        let key = (program.to_string(), args.iter().map(|s| s.to_string()).collect());
        self.scripts.lock().insert(key, output);
    }

    /// Convenience for seeding a successful `--version` probe.
    pub fn script_version(&self, program: &str, version_line: &str) {
        self.script(
            program,
            &["--version"],
            ProcessOutput { success: true, stdout: version_line.to_string(), stderr: String::new() },
        );
    }
}

#[async_trait]
impl ProcessRunner for FakeProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<ProcessOutput, AdapterError> {
        let key = (program.to_string(), args.iter().map(|s| s.to_string()).collect());
        Ok(self.scripts.lock().get(&key).cloned().unwrap_or(ProcessOutput {
            success: false,
            stdout: String::new(),
            stderr: format!("{program}: command not found"),
        }))
    }
}

struct FakeUnit {
    #[allow(dead_code)]
    contents: Vec<u8>,
    state: UnitState,
}

/// In-memory unit registry mirroring the `NotInstalled -> Stopped -> Active`
/// state machine.
#[derive(Clone, Default)]
pub struct FakeServiceManager {
    units: Arc<Mutex<HashMap<String, FakeUnit>>>,
    drop_ins: Arc<Mutex<HashMap<(String, String), Vec<u8>>>>,
    reloads: Arc<std::sync::atomic::AtomicUsize>,
    restarts: Arc<Mutex<HashMap<String, usize>>>,
    write_attempts: Arc<Mutex<HashMap<String, usize>>>,
}

impl FakeServiceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, unit: &str) -> bool {
        self.units.lock().get(unit).map(|u| u.state) == Some(UnitState::Active)
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn restart_count(&self, unit: &str) -> usize {
        self.restarts.lock().get(unit).copied().unwrap_or(0)
    }

    pub async fn unit_exists(&self, unit: &str) -> bool {
        self.units.lock().contains_key(unit)
    }

    /// True once `write_unit_file` has been attempted for `unit` more than
    /// once, i.e. beyond a test's initial seeding call.
    pub fn unit_written_this_call(&self, unit: &str) -> bool {
        self.write_attempts.lock().get(unit).copied().unwrap_or(0) > 1
    }
}

#[async_trait]
impl ServiceManager for FakeServiceManager {
    async fn unit_state(&self, unit: &str) -> Result<UnitState, AdapterError> {
        Ok(self.units.lock().get(unit).map(|u| u.state).unwrap_or(UnitState::NotFound))
    }

    async fn write_unit_file(&self, unit: &str, contents: &[u8]) -> Result<bool, AdapterError> {
        let mut units = self.units.lock();
        if units.contains_key(unit) {
            return Ok(false);
        }
        units.insert(
            unit.to_string(),
            FakeUnit { contents: contents.to_vec(), state: UnitState::Inactive },
        );
        Ok(true)
    }

    async fn write_drop_in(
        &self,
        unit: &str,
        drop_in_name: &str,
        contents: &[u8],
    ) -> Result<bool, AdapterError> {
        let key = (unit.to_string(), drop_in_name.to_string());
        let mut drop_ins = self.drop_ins.lock();
        if drop_ins.get(&key).map(|c| c.as_slice()) == Some(contents) {
            return Ok(false);
        }
        drop_ins.insert(key, contents.to_vec());
        Ok(true)
    }

    async fn daemon_reload(&self) -> Result<(), AdapterError> {
        self.reloads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    async fn start(&self, unit: &str) -> Result<(), AdapterError> {
        let mut units = self.units.lock();
        let entry = units
            .get_mut(unit)
            .ok_or_else(|| AdapterError::UnitNotFound(unit.to_string()))?;
        entry.state = UnitState::Active;
        Ok(())
    }

    async fn stop(&self, unit: &str) -> Result<(), AdapterError> {
        let mut units = self.units.lock();
        if let Some(entry) = units.get_mut(unit) {
            entry.state = UnitState::Inactive;
        }
        Ok(())
    }

    async fn reload_or_restart(&self, unit: &str) -> Result<(), AdapterError> {
        {
            let mut units = self.units.lock();
            let entry = units
                .get_mut(unit)
                .ok_or_else(|| AdapterError::UnitNotFound(unit.to_string()))?;
            entry.state = UnitState::Active;
        }
        *self.restarts.lock().entry(unit.to_string()).or_insert(0) += 1;
        Ok(())
    }
}

/// Scripted kubelet readiness probe.
#[derive(Clone)]
pub struct FakeReadyProbe {
    state: Arc<Mutex<ReadyState>>,
}

impl Default for FakeReadyProbe {
    fn default() -> Self {
        Self { state: Arc::new(Mutex::new(ReadyState::Unknown)) }
    }
}

impl FakeReadyProbe {
    pub fn new(initial: ReadyState) -> Self {
        Self { state: Arc::new(Mutex::new(initial)) }
    }

    pub fn set(&self, state: ReadyState) {
        *self.state.lock() = state;
    }
}

#[async_trait]
impl ReadyProbe for FakeReadyProbe {
    async fn kubelet_ready(&self) -> ReadyState {
        *self.state.lock()
    }
}
