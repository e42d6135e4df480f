// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered configuration loading: compiled-in defaults, overlaid by an
//! optional TOML file, overlaid by `NODEAGENT_*` environment variables.
//! The result passes through the same `defaulting()`/`validate()`
//! discipline action specs use, so a partially-specified file is
//! completed the same way.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default bound on a remote spec's staleness: a snapshot whose collection
/// timestamp is older than this is treated as absent.
pub const DEFAULT_MAX_SPEC_AGE_SECS: i64 = 2 * 60 * 60;
pub const DEFAULT_STATUS_PERIOD_SECS: u64 = 60;
pub const DEFAULT_HEALTH_PERIOD_SECS: u64 = 120;
pub const DEFAULT_DRIFT_PERIOD_SECS: u64 = 600;
pub const DEFAULT_DOWNLOAD_MAX_BYTES: u64 = 1024 * 1024 * 1024;
pub const DEFAULT_KUBELET_JOIN_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_KUBELET_JOIN_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_RUNTIME_DIR: &str = "/var/lib/nodeagent";
const DEFAULT_INSTALL_ROOT: &str = "/";
const DEFAULT_SOCKET_NAME: &str = "nodeagent.sock";
const CONFIG_FILE_NAME: &str = "config.toml";
const BOOTSTRAP_PARAMS_FILE_NAME: &str = "bootstrap-params.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML file exists but failed to parse.
    #[error("malformed config file at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A loaded field failed `validate()`.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// The runtime directory cannot be created. The daemon cannot start
    /// without a writable runtime directory, so this maps to the `Fatal`
    /// taxonomy case.
    #[error("runtime directory {path} is not creatable: {source}")]
    RuntimeDirNotCreatable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ConfigError> for nodeagent_core::NodeAgentError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::RuntimeDirNotCreatable { path, source } => {
                nodeagent_core::NodeAgentError::Fatal(format!("runtime directory {}: {source}", path.display()))
            }
            other => nodeagent_core::NodeAgentError::InvalidArgument(other.to_string()),
        }
    }
}

/// The optional on-disk overlay at `<runtime-dir>/config.toml`. Every
/// field is optional: an absent or empty file changes nothing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct FileConfig {
    runtime_dir: Option<String>,
    install_root: Option<String>,
    socket_path: Option<String>,
    status_period_secs: Option<u64>,
    health_period_secs: Option<u64>,
    drift_period_secs: Option<u64>,
    max_spec_age_secs: Option<i64>,
    kubelet_join_timeout_secs: Option<u64>,
    download_max_bytes: Option<u64>,
    kubernetes_version: Option<String>,
    bootstrap_params_path: Option<String>,
}

/// The single top-level configuration value. Loaded once at process
/// start; the drift loop works from a deep copy of this value so its
/// Kubernetes-version override never races a concurrent reader.
#[derive(Debug, Clone)]
pub struct Config {
    pub runtime_dir: PathBuf,
    pub install_root: PathBuf,
    pub socket_path: PathBuf,
    pub status_period: Duration,
    pub health_period: Duration,
    pub drift_period: Duration,
    pub max_spec_age: chrono::Duration,
    pub kubelet_join_timeout: Duration,
    pub kubelet_join_poll_interval: Duration,
    pub download_max_bytes: u64,
    pub kubernetes_version: String,
    pub bootstrap_params_path: PathBuf,
}

impl Config {
    /// Layer 1: compiled-in constants.
    fn defaults() -> Self {
        Self {
            runtime_dir: PathBuf::from(DEFAULT_RUNTIME_DIR),
            install_root: PathBuf::from(DEFAULT_INSTALL_ROOT),
            socket_path: PathBuf::from(DEFAULT_RUNTIME_DIR).join(DEFAULT_SOCKET_NAME),
            status_period: Duration::from_secs(DEFAULT_STATUS_PERIOD_SECS),
            health_period: Duration::from_secs(DEFAULT_HEALTH_PERIOD_SECS),
            drift_period: Duration::from_secs(DEFAULT_DRIFT_PERIOD_SECS),
            max_spec_age: chrono::Duration::seconds(DEFAULT_MAX_SPEC_AGE_SECS),
            kubelet_join_timeout: Duration::from_secs(DEFAULT_KUBELET_JOIN_TIMEOUT_SECS),
            kubelet_join_poll_interval: Duration::from_secs(DEFAULT_KUBELET_JOIN_POLL_INTERVAL_SECS),
            download_max_bytes: DEFAULT_DOWNLOAD_MAX_BYTES,
            kubernetes_version: String::new(),
            bootstrap_params_path: PathBuf::from(DEFAULT_RUNTIME_DIR).join(BOOTSTRAP_PARAMS_FILE_NAME),
        }
    }

    /// Fills any still-unset field from the compiled defaults. Idempotent:
    /// `defaulting(defaulting(c)) == defaulting(c)`, mirroring the action
    /// spec contract.
    fn defaulting(mut self) -> Self {
        if self.runtime_dir.as_os_str().is_empty() {
            self.runtime_dir = PathBuf::from(DEFAULT_RUNTIME_DIR);
        }
        if self.install_root.as_os_str().is_empty() {
            self.install_root = PathBuf::from(DEFAULT_INSTALL_ROOT);
        }
        if self.socket_path.as_os_str().is_empty() {
            self.socket_path = self.runtime_dir.join(DEFAULT_SOCKET_NAME);
        }
        if self.bootstrap_params_path.as_os_str().is_empty() {
            self.bootstrap_params_path = self.runtime_dir.join(BOOTSTRAP_PARAMS_FILE_NAME);
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.status_period.is_zero() || self.health_period.is_zero() || self.drift_period.is_zero() {
            return Err(ConfigError::Invalid("loop periods must be non-zero".to_string()));
        }
        if self.download_max_bytes == 0 {
            return Err(ConfigError::Invalid("download-max-bytes must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Overlay a TOML file's fields (layer 2) onto `self`.
    fn overlay_file(mut self, file: FileConfig) -> Self {
        if let Some(v) = file.runtime_dir {
            self.runtime_dir = PathBuf::from(v);
        }
        if let Some(v) = file.install_root {
            self.install_root = PathBuf::from(v);
        }
        if let Some(v) = file.socket_path {
            self.socket_path = PathBuf::from(v);
        }
        if let Some(v) = file.status_period_secs {
            self.status_period = Duration::from_secs(v);
        }
        if let Some(v) = file.health_period_secs {
            self.health_period = Duration::from_secs(v);
        }
        if let Some(v) = file.drift_period_secs {
            self.drift_period = Duration::from_secs(v);
        }
        if let Some(v) = file.max_spec_age_secs {
            self.max_spec_age = chrono::Duration::seconds(v);
        }
        if let Some(v) = file.kubelet_join_timeout_secs {
            self.kubelet_join_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.download_max_bytes {
            self.download_max_bytes = v;
        }
        if let Some(v) = file.kubernetes_version {
            self.kubernetes_version = v;
        }
        if let Some(v) = file.bootstrap_params_path {
            self.bootstrap_params_path = PathBuf::from(v);
        }
        self
    }

    /// Overlay `NODEAGENT_*` environment variables (layer 3, highest
    /// precedence).
    fn overlay_env(mut self) -> Self {
        if let Ok(v) = std::env::var("NODEAGENT_RUNTIME_DIR") {
            self.runtime_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("NODEAGENT_INSTALL_ROOT") {
            self.install_root = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("NODEAGENT_SOCKET_PATH") {
            self.socket_path = PathBuf::from(v);
        }
        if let Some(v) = env_u64("NODEAGENT_STATUS_PERIOD_SECS") {
            self.status_period = Duration::from_secs(v);
        }
        if let Some(v) = env_u64("NODEAGENT_HEALTH_PERIOD_SECS") {
            self.health_period = Duration::from_secs(v);
        }
        if let Some(v) = env_u64("NODEAGENT_DRIFT_PERIOD_SECS") {
            self.drift_period = Duration::from_secs(v);
        }
        if let Some(v) = std::env::var("NODEAGENT_MAX_SPEC_AGE_SECS").ok().and_then(|s| s.parse::<i64>().ok()) {
            self.max_spec_age = chrono::Duration::seconds(v);
        }
        if let Some(v) = env_u64("NODEAGENT_KUBELET_JOIN_TIMEOUT_SECS") {
            self.kubelet_join_timeout = Duration::from_secs(v);
        }
        if let Some(v) = env_u64("NODEAGENT_DOWNLOAD_MAX_BYTES") {
            self.download_max_bytes = v;
        }
        if let Ok(v) = std::env::var("NODEAGENT_KUBERNETES_VERSION") {
            self.kubernetes_version = v;
        }
        if let Ok(v) = std::env::var("NODEAGENT_BOOTSTRAP_PARAMS_PATH") {
            self.bootstrap_params_path = PathBuf::from(v);
        }
        self
    }

    /// Build a `Config` from compiled defaults, an optional file at
    /// `<runtime-dir>/config.toml` (or `NODEAGENT_CONFIG_FILE`), and
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::defaults();
        let config_path = std::env::var("NODEAGENT_CONFIG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| defaults.runtime_dir.join(CONFIG_FILE_NAME));

        let file_config = match std::fs::read_to_string(&config_path) {
            Ok(contents) => toml::from_str::<FileConfig>(&contents)
                .map_err(|source| ConfigError::Malformed { path: config_path.clone(), source })?,
            Err(_) => FileConfig::default(),
        };

        let config = defaults.overlay_file(file_config).overlay_env().defaulting();
        config.validate()?;

        std::fs::create_dir_all(&config.runtime_dir)
            .map_err(|source| ConfigError::RuntimeDirNotCreatable { path: config.runtime_dir.clone(), source })?;

        Ok(config)
    }

    pub fn status_path(&self) -> PathBuf {
        self.runtime_dir.join("status.json")
    }

    pub fn spec_path(&self) -> PathBuf {
        self.runtime_dir.join("managedcluster-spec.json")
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
