// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ProcessRunner` — executes version probes, `sysctl --system`, and
//! `kubeadm join` as a subprocess with a hard timeout. A timed-out child is
//! reported as a failed (not erroring) `ProcessOutput` so callers can decide
//! whether a timeout is retryable without matching on the error type.

use crate::error::AdapterError;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str], timeout: Duration) -> Result<ProcessOutput, AdapterError>;
}

pub struct OsProcessRunner;

#[async_trait]
impl ProcessRunner for OsProcessRunner {
    async fn run(&self, program: &str, args: &[&str], timeout: Duration) -> Result<ProcessOutput, AdapterError> {
        let output = match tokio::time::timeout(timeout, tokio::process::Command::new(program).args(args).output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(AdapterError::Process(e.to_string())),
            Err(_) => {
                return Ok(ProcessOutput {
                    success: false,
                    stdout: String::new(),
                    stderr: format!("{program} timed out after {timeout:?}"),
                })
            }
        };

        Ok(ProcessOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Default timeout for a version probe (`<binary> --version`).
pub const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Run `<binary> --version` and report whether the output contains
/// `expected_version`. A spawn failure (binary absent) is treated as "not
/// installed" per the common version-check policy (design §4.2).
pub async fn probe_version_contains(
    runner: &dyn ProcessRunner,
    binary: &str,
    expected_version: &str,
) -> bool {
    match runner.run(binary, &["--version"], VERSION_PROBE_TIMEOUT).await {
        Ok(output) => output.success && output.stdout.contains(expected_version),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_treated_as_not_installed() {
        let runner = OsProcessRunner;
        let found = probe_version_contains(&runner, "/definitely/not/a/binary", "1.0").await;
        assert!(!found);
    }
}
