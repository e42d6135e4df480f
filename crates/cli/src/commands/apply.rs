// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `nodeagent apply -f <file|->` — parses a JSON action document (a
//! single object or an array applied in order) and dispatches each one
//! through the loopback RPC bus a running `agent` process is listening
//! on (design §6 "apply -f <file|->"). Exits non-zero on the first
//! dispatch failure; `--progress` switches the per-step report from a
//! log stream to a step-counter summary.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use nodeagent_bus::socket;
use nodeagent_bus::ActionEnvelope;
use nodeagent_core::NodeAgentError;
use tracing::{error, info};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Path to a JSON action document, or `-` to read from standard input.
    #[arg(short, long)]
    pub file: String,

    /// Print a step counter and pass/fail summary instead of a log stream.
    #[arg(long)]
    pub progress: bool,
}

pub async fn run(args: ApplyArgs, socket_path: &Path) -> Result<(), NodeAgentError> {
    let bytes = read_input(&args.file)?;
    let envelopes = parse_documents(&bytes)?;
    let total = envelopes.len();
    println!("applying {total} action document(s)");

    for (index, envelope) in envelopes.into_iter().enumerate() {
        let type_url = envelope.metadata.type_url.to_string();
        let started = Instant::now();

        match socket::call(socket_path, &envelope).await {
            Ok(_) => {
                let elapsed = started.elapsed();
                if args.progress {
                    println!("[{}/{total}] {type_url} ok ({elapsed:?})", index + 1);
                } else {
                    info!(type_url = %type_url, elapsed_ms = elapsed.as_millis() as u64, "apply: step succeeded");
                }
            }
            Err(e) => {
                if args.progress {
                    println!("[{}/{total}] {type_url} FAILED: {e}", index + 1);
                } else {
                    error!(type_url = %type_url, error = %e, "apply: step failed");
                }
                return Err(e);
            }
        }
    }

    Ok(())
}

fn read_input(file: &str) -> Result<Vec<u8>, NodeAgentError> {
    if file == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| NodeAgentError::Internal(format!("reading standard input: {e}")))?;
        Ok(buf)
    } else {
        std::fs::read(file).map_err(|source| NodeAgentError::io(PathBuf::from(file), source))
    }
}

/// Documents may be a single object or an array applied in order (design
/// §6). Unknown fields are tolerated by `serde_json`'s default behavior.
fn parse_documents(bytes: &[u8]) -> Result<Vec<ActionEnvelope>, NodeAgentError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| NodeAgentError::InvalidArgument(format!("malformed action document: {e}")))?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item)
                .map_err(|e| NodeAgentError::InvalidArgument(format!("malformed action document: {e}")))
        })
        .collect()
}

#[cfg(test)]
#[path = "apply_tests.rs"]
mod tests;
