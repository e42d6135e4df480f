// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ServiceManager` — the capability trait standing in for the concrete
//! systemd D-Bus client (design §4.2): unit state queries, idempotent unit
//! and drop-in file writes, and job dispatch (`start`/`stop`/
//! `reload-or-restart`) all go through here so action handlers never touch
//! `zbus` directly.

use crate::error::AdapterError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Active,
    Inactive,
    Failed,
    NotFound,
}

#[async_trait]
pub trait ServiceManager: Send + Sync {
    async fn unit_state(&self, unit: &str) -> Result<UnitState, AdapterError>;
    async fn write_unit_file(&self, unit: &str, contents: &[u8]) -> Result<bool, AdapterError>;
    async fn write_drop_in(
        &self,
        unit: &str,
        drop_in_name: &str,
        contents: &[u8],
    ) -> Result<bool, AdapterError>;
    async fn daemon_reload(&self) -> Result<(), AdapterError>;
    async fn start(&self, unit: &str) -> Result<(), AdapterError>;
    async fn stop(&self, unit: &str) -> Result<(), AdapterError>;
    async fn reload_or_restart(&self, unit: &str) -> Result<(), AdapterError>;
}

/// Talks to the system D-Bus `org.freedesktop.systemd1` manager. Unit and
/// drop-in files are written under `unit_dir` (normally `/etc/systemd/system`).
pub struct SystemdServiceManager {
    unit_dir: PathBuf,
}

impl SystemdServiceManager {
    pub fn new(unit_dir: impl Into<PathBuf>) -> Self {
        Self { unit_dir: unit_dir.into() }
    }

    fn unit_path(&self, unit: &str) -> PathBuf {
        self.unit_dir.join(unit)
    }

    fn drop_in_dir(&self, unit: &str) -> PathBuf {
        self.unit_dir.join(format!("{unit}.d"))
    }

    async fn connection(&self) -> Result<zbus::Connection, AdapterError> {
        zbus::Connection::system()
            .await
            .map_err(|e| AdapterError::Systemd(e.to_string()))
    }
}

#[async_trait]
impl ServiceManager for SystemdServiceManager {
    async fn unit_state(&self, unit: &str) -> Result<UnitState, AdapterError> {
        let connection = self.connection().await?;
        let proxy = zbus::Proxy::new(
            &connection,
            "org.freedesktop.systemd1",
            "/org/freedesktop/systemd1",
            "org.freedesktop.systemd1.Manager",
        )
        .await
        .map_err(|e| AdapterError::Systemd(e.to_string()))?;

        let result: Result<zvariant::OwnedObjectPath, zbus::Error> =
            proxy.call("GetUnit", &(unit,)).await;

        let unit_path = match result {
            Ok(path) => path,
            Err(zbus::Error::MethodError(name, _, _)) if name.contains("NoSuchUnit") => {
                return Ok(UnitState::NotFound);
            }
            Err(e) => return Err(AdapterError::Systemd(e.to_string())),
        };

        let unit_proxy = zbus::Proxy::new(
            &connection,
            "org.freedesktop.systemd1",
            unit_path,
            "org.freedesktop.systemd1.Unit",
        )
        .await
        .map_err(|e| AdapterError::Systemd(e.to_string()))?;

        let active_state: String = unit_proxy
            .get_property("ActiveState")
            .await
            .map_err(|e| AdapterError::Systemd(e.to_string()))?;

        Ok(match active_state.as_str() {
            "active" | "activating" => UnitState::Active,
            "failed" => UnitState::Failed,
            _ => UnitState::Inactive,
        })
    }

    async fn write_unit_file(&self, unit: &str, contents: &[u8]) -> Result<bool, AdapterError> {
        let path = self.unit_path(unit);
        if path.exists() {
            return Ok(false);
        }
        std::fs::create_dir_all(&self.unit_dir)?;
        write_atomic_mode(&path, contents, 0o600)?;
        Ok(true)
    }

    async fn write_drop_in(
        &self,
        unit: &str,
        drop_in_name: &str,
        contents: &[u8],
    ) -> Result<bool, AdapterError> {
        let dir = self.drop_in_dir(unit);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(drop_in_name);
        if path.exists() && std::fs::read(&path)? == contents {
            return Ok(false);
        }
        write_atomic_mode(&path, contents, 0o600)?;
        Ok(true)
    }

    async fn daemon_reload(&self) -> Result<(), AdapterError> {
        let connection = self.connection().await?;
        let proxy = zbus::Proxy::new(
            &connection,
            "org.freedesktop.systemd1",
            "/org/freedesktop/systemd1",
            "org.freedesktop.systemd1.Manager",
        )
        .await
        .map_err(|e| AdapterError::Systemd(e.to_string()))?;
        proxy
            .call::<_, _, ()>("Reload", &())
            .await
            .map_err(|e| AdapterError::Systemd(e.to_string()))
    }

    async fn start(&self, unit: &str) -> Result<(), AdapterError> {
        self.job_call(unit, "StartUnit").await
    }

    async fn stop(&self, unit: &str) -> Result<(), AdapterError> {
        self.job_call(unit, "StopUnit").await
    }

    async fn reload_or_restart(&self, unit: &str) -> Result<(), AdapterError> {
        self.job_call(unit, "ReloadOrRestartUnit").await
    }
}

impl SystemdServiceManager {
    async fn job_call(&self, unit: &str, method: &str) -> Result<(), AdapterError> {
        let connection = self.connection().await?;
        let proxy = zbus::Proxy::new(
            &connection,
            "org.freedesktop.systemd1",
            "/org/freedesktop/systemd1",
            "org.freedesktop.systemd1.Manager",
        )
        .await
        .map_err(|e| AdapterError::Systemd(e.to_string()))?;
        proxy
            .call::<_, _, zvariant::OwnedObjectPath>(method, &(unit, "replace"))
            .await
            .map(|_| ())
            .map_err(|e| AdapterError::Systemd(e.to_string()))
    }
}

/// Atomic tempfile-then-rename write with an explicit mode, mirroring the
/// snapshot store's write discipline so unit/drop-in files never appear
/// partially written to systemd or a concurrent reader.
fn write_atomic_mode(path: &Path, contents: &[u8], mode: u32) -> std::io::Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    {
        use std::io::Write;
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(mode))?;
        }
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)
}
