// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`DaemonSupervisor`] — starts the three periodic loops, owns the mutex
//! gate, performs startup hygiene, and joins everything on cancellation
//! (design §4.7).

use crate::config::Config;
use nodeagent_actions::context::ActionContext;
use nodeagent_adapters::credential_exec::SelfExecPlugin;
use nodeagent_adapters::downloader::HttpDownloader;
use nodeagent_adapters::process::OsProcessRunner;
use nodeagent_adapters::ready_probe::HttpReadyProbe;
use nodeagent_adapters::service_manager::SystemdServiceManager;
use nodeagent_bus::Dispatcher;
use nodeagent_core::{Clock, MutexGate, NodeAgentError, SystemClock};
use nodeagent_drift::detector::KubernetesVersionDetector;
use nodeagent_drift::engine::DriftEngine;
use nodeagent_executor::executor::{BootstrapExecutor, FailurePolicy};
use nodeagent_executor::plan::{full_bootstrap, BootstrapParams};
use nodeagent_executor::result::ExecutionResult;
use nodeagent_status::{needs_bootstrap, StatusCollector};
use nodeagent_storage::{snapshot_store, SnapshotStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const KUBELET_READY_HEALTHZ_URL: &str = "http://127.0.0.1:10248/healthz";

/// Coordinates the three periodic loops (status, health, drift) over one
/// shared [`ActionContext`], [`BootstrapExecutor`], and [`MutexGate`]
/// (design §4.7).
pub struct DaemonSupervisor<C: Clock> {
    config: Config,
    store: SnapshotStore,
    status_collector: StatusCollector<C>,
    drift_engine: DriftEngine<C>,
    executor: BootstrapExecutor,
    dispatcher: Dispatcher,
    gate: MutexGate,
    clock: C,
    cancellation: CancellationToken,
}

/// Assembles the production [`ActionContext`] from `config`: real systemd,
/// process, download, and ready-probe backends rooted under
/// `config.install_root`.
pub fn build_action_context(config: &Config, cancellation: CancellationToken) -> ActionContext {
    let unit_dir = config.install_root.join("etc/systemd/system");
    let service_manager: Arc<dyn nodeagent_adapters::ServiceManager> = Arc::new(SystemdServiceManager::new(unit_dir));
    let process_runner: Arc<dyn nodeagent_adapters::ProcessRunner> = Arc::new(OsProcessRunner);
    let ready_probe: Arc<dyn nodeagent_adapters::ReadyProbe> =
        Arc::new(HttpReadyProbe::new(KUBELET_READY_HEALTHZ_URL));
    let downloader: Arc<dyn nodeagent_adapters::Downloader> = Arc::new(HttpDownloader::new());
    let credential_exec: Arc<dyn nodeagent_adapters::CredentialExecPlugin> =
        Arc::new(SelfExecPlugin::new(std::env::args().next().unwrap_or_else(|| "nodeagent".to_string())));

    ActionContext {
        service_manager,
        downloader,
        process_runner,
        ready_probe,
        credential_exec,
        bin_root: config.install_root.join("usr/local/bin"),
        cni_bin_root: config.install_root.join("opt/cni/bin"),
        etc_root: config.install_root.clone(),
        download_max_bytes: config.download_max_bytes,
        kubelet_join_timeout: config.kubelet_join_timeout,
        kubelet_join_poll_interval: config.kubelet_join_poll_interval,
        cancellation,
    }
}

impl DaemonSupervisor<SystemClock> {
    pub fn new(config: Config) -> Result<Self, NodeAgentError> {
        let cancellation = CancellationToken::new();
        let ctx = build_action_context(&config, cancellation.clone());
        Self::from_context(config, ctx, SystemClock, cancellation)
    }
}

impl<C: Clock> DaemonSupervisor<C> {
    /// Builds the supervisor from an already-assembled [`ActionContext`],
    /// used by the production constructor and, behind `test-support`, by
    /// integration tests driving the same loop logic against fakes.
    pub fn from_context(config: Config, ctx: ActionContext, clock: C, cancellation: CancellationToken) -> Result<Self, NodeAgentError> {
        let registry = nodeagent_bus::registry::build()?;
        let dispatcher = Dispatcher::new(registry, ctx);
        let executor = BootstrapExecutor::new(dispatcher.clone());
        let store = SnapshotStore::new();
        let gate = MutexGate::new();

        let status_collector = StatusCollector::new(
            Arc::clone(&dispatcher.context().service_manager),
            Arc::clone(&dispatcher.context().process_runner),
            Arc::clone(&dispatcher.context().ready_probe),
            clock.clone(),
            env!("CARGO_PKG_VERSION"),
        );

        let kubelet_params = load_bootstrap_params(&config)
            .ok()
            .flatten()
            .map(|params| params.kubelet)
            .unwrap_or_else(|| nodeagent_executor::plan::KubeletParams {
                server: String::new(),
                ca_pem: String::new(),
                node_ip: String::new(),
                extra_args: Vec::new(),
                auth: Default::default(),
            });

        let drift_engine = DriftEngine::new(
            store.clone(),
            config.status_path(),
            config.spec_path(),
            BootstrapExecutor::new(dispatcher.clone()),
            vec![Arc::new(KubernetesVersionDetector) as Arc<_>],
            gate.clone(),
            config.max_spec_age,
            env!("CARGO_PKG_VERSION"),
            kubelet_params,
            clock.clone(),
        );

        Ok(Self { config, store, status_collector, drift_engine, executor, dispatcher, gate, clock, cancellation })
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Startup hygiene: recreate the runtime directory with restrictive
    /// permissions, drop any stale snapshot from a previous run, collect
    /// and persist a fresh status snapshot, write the spec snapshot if
    /// provisioning parameters are available, and run one drift pass
    /// before entering the periodic loops.
    pub async fn startup(&self) -> Result<(), NodeAgentError> {
        std::fs::create_dir_all(&self.config.runtime_dir)
            .map_err(|source| NodeAgentError::Io { path: self.config.runtime_dir.clone(), source })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.config.runtime_dir, std::fs::Permissions::from_mode(0o750))
                .map_err(|source| NodeAgentError::Io { path: self.config.runtime_dir.clone(), source })?;
        }

        self.store.remove_status(&self.config.status_path());
        self.store.remove_spec(&self.config.spec_path());

        let status = self.status_collector.collect().await;
        self.store.write_status(&self.config.status_path(), &status)?;

        if let Some(params) = load_bootstrap_params(&self.config)? {
            let spec = nodeagent_core::ManagedClusterSpec {
                schema_version: nodeagent_core::MANAGED_CLUSTER_SPEC_SCHEMA_VERSION,
                kubernetes_version: params.kubernetes_version.clone(),
                current_kubernetes_version: self.config.kubernetes_version.clone(),
                collected_at: self.clock.now(),
            };
            self.store.write_spec(&self.config.spec_path(), &spec)?;
        }

        match self.drift_engine.run_tick().await {
            Ok(outcome) => info!(?outcome, "daemon supervisor: startup drift pass complete"),
            Err(e) => warn!(error = %e, "daemon supervisor: startup drift pass failed"),
        }

        Ok(())
    }

    /// Runs the full bootstrap step list once, gated by the mutex (design
    /// §6 `agent` CLI entry point: "run full bootstrap then enter
    /// supervisor loop"). `Ok(None)` when no bootstrap parameters have been
    /// provisioned yet — the health loop will retry once they appear.
    pub async fn run_full_bootstrap(&self) -> Result<Option<ExecutionResult>, NodeAgentError> {
        let Some(params) = load_bootstrap_params(&self.config)? else {
            warn!("agent: no bootstrap parameters available, skipping initial bootstrap");
            return Ok(None);
        };

        let Some(guard) = self.gate.try_acquire() else {
            return Err(NodeAgentError::Transient("mutex gate already held at startup".to_string()));
        };
        let result = self.executor.run(full_bootstrap(&params), FailurePolicy::AbortOnFirstFailure).await;
        drop(guard);
        Ok(Some(result))
    }

    /// Runs the status, health, and drift loops plus the loopback RPC
    /// server concurrently until `cancellation` fires.
    pub async fn run(&self) {
        tokio::join!(self.status_loop(), self.health_loop(), self.drift_loop(), self.rpc_loop());
    }

    /// Serves `apply`'s loopback RPC transport until `cancellation` fires
    /// (design §4.1, §6 `apply -f <file|->`).
    async fn rpc_loop(&self) {
        if let Err(e) = nodeagent_bus::socket::serve(&self.config.socket_path, self.dispatcher.clone(), self.cancellation.clone()).await
        {
            error!(error = %e, "rpc loop: loopback socket server exited");
        }
    }

    async fn status_loop(&self) {
        let mut ticker = tokio::time::interval(self.config.status_period);
        loop {
            tokio::select! {
                _ = self.cancellation.cancelled() => return,
                _ = ticker.tick() => {
                    let started = std::time::Instant::now();
                    let status = self.status_collector.collect().await;
                    match self.store.write_status(&self.config.status_path(), &status) {
                        Ok(()) => info!(elapsed_ms = started.elapsed().as_millis() as u64, "status loop: tick complete"),
                        Err(e) => warn!(error = %e, "status loop: failed to persist snapshot"),
                    }
                }
            }
        }
    }

    async fn health_loop(&self) {
        let mut ticker = tokio::time::interval(self.config.health_period);
        loop {
            tokio::select! {
                _ = self.cancellation.cancelled() => return,
                _ = ticker.tick() => {
                    if let Err(e) = self.health_tick().await {
                        warn!(error = %e, "health loop: tick failed");
                    }
                }
            }
        }
    }

    async fn health_tick(&self) -> Result<(), NodeAgentError> {
        let status = self.store.load_status(&self.config.status_path())?;
        if !needs_bootstrap(status.as_ref(), &self.config.kubernetes_version) {
            debug!("health loop: node converged, no bootstrap needed");
            return Ok(());
        }

        let Some(params) = load_bootstrap_params(&self.config)? else {
            warn!("health loop: bootstrap needed but no provisioning parameters are available");
            return Ok(());
        };

        let Some(guard) = self.gate.try_acquire() else {
            info!("health loop: mutex gate already held, deferring bootstrap to next tick");
            return Ok(());
        };

        let started = std::time::Instant::now();
        let result = self.executor.run(full_bootstrap(&params), FailurePolicy::AbortOnFirstFailure).await;
        drop(guard);

        if result.success {
            info!(elapsed_ms = started.elapsed().as_millis() as u64, "health loop: bootstrap converged");
        } else {
            error!(error = ?result.error, "health loop: bootstrap failed");
        }
        Ok(())
    }

    async fn drift_loop(&self) {
        let mut ticker = tokio::time::interval(self.config.drift_period);
        loop {
            tokio::select! {
                _ = self.cancellation.cancelled() => return,
                _ = ticker.tick() => {
                    self.refresh_spec_snapshot();
                    match self.drift_engine.run_tick().await {
                        Ok(outcome) => info!(?outcome, "drift loop: tick complete"),
                        Err(e) => warn!(error = %e, "drift loop: tick failed"),
                    }
                }
            }
        }
    }

    /// Re-reads the provisioning file's desired Kubernetes version into the
    /// spec snapshot before every drift tick, so a provisioning update
    /// picked up between ticks is visible to the next one.
    fn refresh_spec_snapshot(&self) {
        let Ok(Some(params)) = load_bootstrap_params(&self.config) else {
            return;
        };
        let spec = nodeagent_core::ManagedClusterSpec {
            schema_version: nodeagent_core::MANAGED_CLUSTER_SPEC_SCHEMA_VERSION,
            kubernetes_version: params.kubernetes_version,
            current_kubernetes_version: self.config.kubernetes_version.clone(),
            collected_at: self.clock.now(),
        };
        if let Err(e) = self.store.write_spec(&self.config.spec_path(), &spec) {
            warn!(error = %e, "drift loop: failed to refresh spec snapshot");
        }
    }
}

/// Loads the provisioning-supplied bootstrap parameters (install-time
/// packages, versions, kubeadm join token, kubelet auth) from the path
/// `Config` names. `Ok(None)` when the file does not exist yet, mirroring
/// the snapshot store's own absent-file convention (design §4.4).
fn load_bootstrap_params(config: &Config) -> Result<Option<BootstrapParams>, NodeAgentError> {
    snapshot_store::read_json(&config.bootstrap_params_path).map_err(NodeAgentError::from)
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
