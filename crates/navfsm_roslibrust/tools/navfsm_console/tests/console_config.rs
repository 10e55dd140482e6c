use std::env;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use navfsm_console::config::{Config, DEFAULT_PUBLISH_HZ};
use navfsm_core::error::{Domain, ErrorKind};

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().expect("lock")
}

fn clear_env() {
    for key in [
        "NAVFSM_VEHICLE",
        "NAVFSM_PUBLISH_HZ",
        "NAVFSM_WAIT_TIMEOUT_MS",
        "NAVFSM_SEQUENTIAL",
    ] {
        env::remove_var(key);
    }
}

#[test]
fn defaults_without_args_or_env() {
    let _guard = env_lock();
    clear_env();

    let config = Config::from_args_iter(["bin"]).unwrap();
    assert_eq!(config.vehicle, "pebbles");
    assert_eq!(config.publish_hz, DEFAULT_PUBLISH_HZ);
    assert_eq!(config.wait_timeout, Duration::from_secs(1000));
    assert!(!config.sequential);
}

#[test]
fn flags_in_both_forms() {
    let _guard = env_lock();
    clear_env();

    let config = Config::from_args_iter([
        "bin",
        "--vehicle",
        "duckie7",
        "--publish-hz=20",
        "--wait-timeout-ms",
        "2500",
        "--sequential",
    ])
    .unwrap();
    assert_eq!(config.vehicle, "duckie7");
    assert_eq!(config.publish_hz, 20);
    assert_eq!(config.wait_timeout, Duration::from_millis(2500));
    assert!(config.sequential);
}

#[test]
fn env_overrides_defaults_and_args_override_env() {
    let _guard = env_lock();
    clear_env();
    env::set_var("NAVFSM_VEHICLE", "from_env");
    env::set_var("NAVFSM_SEQUENTIAL", "yes");
    env::set_var("NAVFSM_PUBLISH_HZ", "5");

    let config = Config::from_args_iter(["bin", "--vehicle=from_args"]).unwrap();
    assert_eq!(config.vehicle, "from_args");
    assert_eq!(config.publish_hz, 5);
    assert!(config.sequential);

    clear_env();
}

#[test]
fn invalid_number_is_config_error() {
    let _guard = env_lock();
    clear_env();

    let err = Config::from_args_iter(["bin", "--wait-timeout-ms", "soon"]).unwrap_err();
    assert_eq!(err.domain, Domain::Config);
    assert_eq!(err.kind, ErrorKind::InvalidConfiguration);

    let err = Config::from_args_iter(["bin", "--publish-hz=0"]).unwrap_err();
    assert_eq!(err.domain, Domain::Config);
}

#[test]
fn invalid_env_number_is_rejected() {
    let _guard = env_lock();
    clear_env();
    env::set_var("NAVFSM_PUBLISH_HZ", "fast");

    assert!(Config::from_args_iter(["bin"]).is_err());

    clear_env();
}
