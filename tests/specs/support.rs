//! Shared harness for the `nodeagent` binary specs: a scratch runtime
//! directory plus a `Command` pre-wired with `NODEAGENT_*` environment
//! variables pointing at it.

use assert_cmd::Command;
use std::path::{Path, PathBuf};

pub struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("runtime")).expect("create runtime dir");
        std::fs::create_dir_all(dir.path().join("install")).expect("create install root");
        Self { dir }
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.dir.path().join("runtime")
    }

    pub fn install_root(&self) -> PathBuf {
        self.dir.path().join("install")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.runtime_dir().join("nodeagent.sock")
    }

    /// An `assert_cmd::Command` for the `nodeagent` binary, scoped entirely
    /// to this fixture's scratch directories so no test ever touches the
    /// real host.
    pub fn nodeagent(&self) -> Command {
        let mut cmd = Command::cargo_bin("nodeagent").expect("nodeagent binary builds");
        cmd.env("NODEAGENT_RUNTIME_DIR", self.runtime_dir())
            .env("NODEAGENT_INSTALL_ROOT", self.install_root())
            .env("NODEAGENT_SOCKET_PATH", self.socket_path())
            .env_remove("NODEAGENT_AUTH_METHOD")
            .env_remove("NODEAGENT_TENANT_ID")
            .env_remove("NODEAGENT_CLIENT_ID")
            .env_remove("NODEAGENT_CONFIG_FILE")
            .env_remove("NODEAGENT_BOOTSTRAP_PARAMS_PATH");
        cmd
    }

    pub fn write_file(&self, relative: impl AsRef<Path>, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, contents).expect("write fixture file");
        path
    }
}

/// Fluent assertions over an `assert_cmd` output, in the same spirit as the
/// rest of this workspace's handler tests.
pub trait OutputAssertExt {
    fn passes(self) -> assert_cmd::assert::Assert;
    fn fails(self) -> assert_cmd::assert::Assert;
}

impl OutputAssertExt for &mut Command {
    fn passes(self) -> assert_cmd::assert::Assert {
        self.assert().success()
    }

    fn fails(self) -> assert_cmd::assert::Assert {
        self.assert().failure()
    }
}

pub trait AssertStdioExt {
    fn stdout_has(self, needle: &str) -> Self;
    fn stderr_has(self, needle: &str) -> Self;
}

impl AssertStdioExt for assert_cmd::assert::Assert {
    fn stdout_has(self, needle: &str) -> Self {
        let output = self.get_output().stdout.clone();
        let text = String::from_utf8_lossy(&output);
        assert!(text.contains(needle), "expected stdout to contain {needle:?}, got:\n{text}");
        self
    }

    fn stderr_has(self, needle: &str) -> Self {
        let output = self.get_output().stderr.clone();
        let text = String::from_utf8_lossy(&output);
        assert!(text.contains(needle), "expected stderr to contain {needle:?}, got:\n{text}");
        self
    }
}
