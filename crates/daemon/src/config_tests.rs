use super::*;

fn clear_env() {
    for var in [
        "NODEAGENT_CONFIG_FILE",
        "NODEAGENT_RUNTIME_DIR",
        "NODEAGENT_INSTALL_ROOT",
        "NODEAGENT_SOCKET_PATH",
        "NODEAGENT_STATUS_PERIOD_SECS",
        "NODEAGENT_HEALTH_PERIOD_SECS",
        "NODEAGENT_DRIFT_PERIOD_SECS",
        "NODEAGENT_MAX_SPEC_AGE_SECS",
        "NODEAGENT_KUBELET_JOIN_TIMEOUT_SECS",
        "NODEAGENT_DOWNLOAD_MAX_BYTES",
        "NODEAGENT_KUBERNETES_VERSION",
    ] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial_test::serial]
fn defaults_apply_when_nothing_is_set() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("NODEAGENT_RUNTIME_DIR", dir.path());

    let config = Config::load().unwrap();
    assert_eq!(config.status_period, Duration::from_secs(DEFAULT_STATUS_PERIOD_SECS));
    assert_eq!(config.health_period, Duration::from_secs(DEFAULT_HEALTH_PERIOD_SECS));
    assert_eq!(config.drift_period, Duration::from_secs(DEFAULT_DRIFT_PERIOD_SECS));
    assert_eq!(config.socket_path, dir.path().join(DEFAULT_SOCKET_NAME));
    clear_env();
}

#[test]
#[serial_test::serial]
fn file_overlay_overrides_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "status-period-secs = 30\nkubernetes-version = \"1.30.7\"\n")
        .unwrap();
    std::env::set_var("NODEAGENT_RUNTIME_DIR", dir.path());

    let config = Config::load().unwrap();
    assert_eq!(config.status_period, Duration::from_secs(30));
    assert_eq!(config.kubernetes_version, "1.30.7");
    clear_env();
}

#[test]
#[serial_test::serial]
fn env_overlay_wins_over_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "status-period-secs = 30\n").unwrap();
    std::env::set_var("NODEAGENT_RUNTIME_DIR", dir.path());
    std::env::set_var("NODEAGENT_STATUS_PERIOD_SECS", "15");

    let config = Config::load().unwrap();
    assert_eq!(config.status_period, Duration::from_secs(15));
    clear_env();
}

#[test]
#[serial_test::serial]
fn malformed_file_is_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "this is not [ toml").unwrap();
    std::env::set_var("NODEAGENT_RUNTIME_DIR", dir.path());

    let err = Config::load().unwrap_err();
    assert!(matches!(err, ConfigError::Malformed { .. }));
    clear_env();
}

#[test]
#[serial_test::serial]
fn zero_period_fails_validation() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("NODEAGENT_RUNTIME_DIR", dir.path());
    std::env::set_var("NODEAGENT_STATUS_PERIOD_SECS", "0");

    let err = Config::load().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    clear_env();
}
