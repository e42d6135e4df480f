// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `nodeagent` — the on-host node-lifecycle agent's CLI surface (design
//! §6 "CLI surface (supervisor entry points)"):
//!
//! - `agent` — run full bootstrap then enter the supervisor loop.
//! - `unbootstrap` — run the reverse/cleanup step list, best-effort.
//! - `apply -f <file|->` — dispatch an action document through the bus.
//! - `version` — print embedded build metadata.
//! - `token kubelogin` — the kubelet credential-exec plugin entry point
//!   the generated kubeconfig invokes.

mod commands;

use clap::{Parser, Subcommand};
use nodeagent_daemon::{Config, DaemonError, LogFormat};
use tracing::error;

#[derive(Parser)]
#[command(name = "nodeagent", version = env!("CARGO_PKG_VERSION"), about = "On-host node-lifecycle reconciliation agent")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run full bootstrap, then enter the supervisor loop.
    Agent,
    /// Run the reverse/cleanup step list, best-effort.
    Unbootstrap,
    /// Dispatch a JSON action document through the bus.
    Apply(commands::apply::ApplyArgs),
    /// Print embedded build metadata.
    Version,
    /// The kubelet credential-exec plugin entry points.
    Token {
        #[command(subcommand)]
        command: commands::token::TokenCommand,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result: Result<(), DaemonError> = match cli.command {
        Command::Agent => {
            nodeagent_daemon::init_tracing(LogFormat::Json);
            run_agent().await
        }
        Command::Unbootstrap => {
            nodeagent_daemon::init_tracing(LogFormat::Compact);
            run_unbootstrap().await
        }
        Command::Apply(args) => {
            nodeagent_daemon::init_tracing(LogFormat::Compact);
            run_apply(args).await
        }
        Command::Version => {
            commands::version::run();
            Ok(())
        }
        Command::Token { command } => {
            nodeagent_daemon::init_tracing(LogFormat::Compact);
            commands::token::run(command).await.map_err(DaemonError::NodeAgent)
        }
    };

    if let Err(err) = result {
        error!(error = %err, "nodeagent: command failed");
        std::process::exit(err.exit_code());
    }
}

async fn run_agent() -> Result<(), DaemonError> {
    let config = Config::load()?;
    commands::agent::run(config).await.map_err(DaemonError::NodeAgent)
}

async fn run_unbootstrap() -> Result<(), DaemonError> {
    let config = Config::load()?;
    commands::unbootstrap::run(&config).await.map_err(DaemonError::NodeAgent)
}

async fn run_apply(args: commands::apply::ApplyArgs) -> Result<(), DaemonError> {
    let config = Config::load()?;
    commands::apply::run(args, &config.socket_path).await.map_err(DaemonError::NodeAgent)
}
