use std::sync::Mutex;

use pretty_assertions::assert_eq;
use tracing_subscriber::filter::LevelFilter;
use vigil_config::{init_tracing, LoggingConfig, VigilConfig};

static RUST_LOG_LOCK: Mutex<()> = Mutex::new(());

fn with_rust_log<T>(value: Option<&str>, f: impl FnOnce() -> T) -> T {
    let _lock = RUST_LOG_LOCK.lock().expect("RUST_LOG_LOCK mutex poisoned");
    let prev = std::env::var_os("RUST_LOG");
    match value {
        Some(value) => std::env::set_var("RUST_LOG", value),
        None => std::env::remove_var("RUST_LOG"),
    }
    let out = f();
    match prev {
        Some(prev) => std::env::set_var("RUST_LOG", prev),
        None => std::env::remove_var("RUST_LOG"),
    }
    out
}

#[test]
fn rust_log_is_layered_over_the_configured_level() {
    let config = VigilConfig::load_from_str("[logging]\nlevel = \"Warning\"\n").unwrap();
    assert_eq!(config.logging.level, "Warning");

    let hint = with_rust_log(None, || config.logging.env_filter().max_level_hint());
    assert_eq!(hint, Some(LevelFilter::WARN));

    let hint = with_rust_log(Some("vigil_fix=trace"), || {
        config.logging.env_filter().max_level_hint()
    });
    assert_eq!(hint, Some(LevelFilter::TRACE));

    let hint = with_rust_log(Some("  "), || config.logging.env_filter().max_level_hint());
    assert_eq!(hint, Some(LevelFilter::WARN));
}

#[test]
fn tracing_is_installed_once() {
    let config = LoggingConfig {
        level: "debug".to_owned(),
        json: true,
    };
    let first = with_rust_log(None, || init_tracing(&config));
    assert!(first);
    assert!(!init_tracing(&LoggingConfig::default()));
}
