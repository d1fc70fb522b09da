use std::ffi::OsString;
use std::sync::Mutex;

use tempfile::tempdir;
use vigil_config::{
    discover_config_path, load_for_workspace, ConfigError, VigilConfig, VIGIL_CONFIG_ENV_VAR,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: &std::path::Path) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_vigil_toml_before_the_hidden_file() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(VIGIL_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let hidden = dir.path().join(".vigil.toml");
    std::fs::write(&hidden, "[logging]\nlevel = \"warn\"\n").unwrap();
    assert_eq!(
        discover_config_path(dir.path()),
        Some(hidden.canonicalize().unwrap_or(hidden))
    );

    let visible = dir.path().join("vigil.toml");
    std::fs::write(&visible, "[logging]\nlevel = \"debug\"\n").unwrap();
    assert_eq!(
        discover_config_path(dir.path()),
        Some(visible.canonicalize().unwrap_or(visible))
    );
}

#[test]
fn env_override_wins_over_workspace_file() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("vigil.toml"), "[checks]\ndisable_all = true\n").unwrap();
    std::fs::write(
        dir.path().join("override.toml"),
        "[logging]\nlevel = \"debug\"\n[checks.severity]\nArrayToString = \"off\"\n",
    )
    .unwrap();

    // Relative overrides resolve against the workspace root.
    let _env = EnvVarGuard::set(VIGIL_CONFIG_ENV_VAR, std::path::Path::new("override.toml"));
    let (config, path) = load_for_workspace(dir.path()).unwrap();
    let expected = dir.path().join("override.toml");
    assert_eq!(path, Some(expected.canonicalize().unwrap_or(expected)));
    assert_eq!(config.logging.level, "debug");
    assert!(!config.checks.disable_all);
    assert_eq!(config.checks.severity.len(), 1);
}

#[test]
fn missing_config_loads_defaults() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(VIGIL_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(config, VigilConfig::default());
    assert_eq!(path, None);
}

#[test]
fn unreadable_override_reports_the_path() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let _env = EnvVarGuard::set(VIGIL_CONFIG_ENV_VAR, &missing);

    let err = load_for_workspace(dir.path()).unwrap_err();
    match err {
        ConfigError::Io { path, .. } => assert!(path.ends_with("nope.toml"), "{path}"),
        other => panic!("expected an io error, got {other:?}"),
    }
}
