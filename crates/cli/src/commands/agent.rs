// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `nodeagent agent` — run full bootstrap then enter the supervisor loop
//! (design §6 "agent"). Runs until a shutdown signal cancels the
//! supervisor's loops, at which point `run` returns the supervisor's
//! cancellation error.

use nodeagent_core::NodeAgentError;
use nodeagent_daemon::{Config, DaemonSupervisor};
use tracing::{error, info, warn};

pub async fn run(config: Config) -> Result<(), NodeAgentError> {
    let supervisor = DaemonSupervisor::new(config)?;
    let cancellation = supervisor.cancellation();

    match supervisor.run_full_bootstrap().await {
        Ok(Some(result)) if result.success => {
            info!(step_count = result.step_count, "agent: initial bootstrap converged");
        }
        Ok(Some(result)) => {
            error!(error = ?result.error, "agent: initial bootstrap failed, continuing into supervisor loop");
        }
        Ok(None) => {
            warn!("agent: no bootstrap parameters provisioned yet, starting supervisor loop anyway");
        }
        Err(e) => {
            error!(error = %e, "agent: could not run initial bootstrap, continuing into supervisor loop");
        }
    }

    supervisor.startup().await?;

    let shutdown_cancellation = cancellation.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("agent: shutdown signal received, cancelling supervisor loops");
        shutdown_cancellation.cancel();
    });

    supervisor.run().await;
    Ok(())
}

/// Waits for SIGTERM (the systemd-managed stop signal) or SIGINT/Ctrl-C.
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
