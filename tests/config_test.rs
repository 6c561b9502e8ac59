use serial_test::serial;
use std::{env, fs, path::PathBuf, time::Duration};
use tempfile::TempDir;
use tj_request_rotator::app::{App, Config, ConfigError, RunMode};
use tj_request_rotator::domain::{ProxyType, RotatorError};
use tj_request_rotator::reliability::DelayRange;

// Helper function to clean all environment variables before and after tests
fn clean_all_env_vars() {
    let env_vars = [
        "ROTATOR_CONFIG",
        "ROTATOR_MODE",
        "ROTATOR_ROUNDS",
        "ROTATOR_RETRIES",
        "ROTATOR_TIMEOUT_SEC",
        "ROTATOR_PROXY_LIMIT",
        "ROTATOR_SOCKS_PORT",
        "ROTATOR_CATALOG_BASE_URL",
        "LOG_LEVEL",
        "LOG_FORMAT",
    ];

    unsafe {
        for var in &env_vars {
            env::remove_var(var);
        }
    }
}

fn write_settings(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn config_for(path: &std::path::Path) -> Config {
    Config {
        config_file: path.to_path_buf(),
        ..Config::default()
    }
}

const LEGACY_JSON: &str = r#"{
    "run": {
        "mode": "proxy",
        "proxy": {"type": "SOCKS", "limit": 2},
        "rounds": 2,
        "timeoutSec": 10,
        "retries": 1,
        "retryDelayMs": 400,
        "delayMs": {"min": 100, "max": 300},
        "allowProposeIfNotFound": true,
        "tor": {"manageService": true, "serviceName": "tor", "socksPort": 9050, "waitPortSec": 60}
    },
    "songs": [
        {"title": "Hype Boy", "singer": "NewJeans"},
        {"songTitle": "첫눈", "singer": "EXO", "genre": "가요", "po_name": "눈사람"}
    ]
}"#;

#[test]
#[serial]
fn test_load_legacy_json_document() {
    clean_all_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_settings(&dir, "setting.macro.json", LEGACY_JSON);

    let document = config_for(&path).load_settings().unwrap();

    assert_eq!(document.run.mode, RunMode::Proxy);
    assert_eq!(document.run.proxy.proxy_type, ProxyType::Socks);
    assert_eq!(document.run.proxy.limit, 2);
    assert_eq!(document.run.timeout_sec, 10);
    assert_eq!(document.songs.len(), 2);
    assert_eq!(document.songs[1].title.as_deref(), Some("첫눈"));
    assert_eq!(document.songs[1].proposer_name(), "눈사람");
    clean_all_env_vars();
}

#[test]
#[serial]
fn test_load_toml_document() {
    clean_all_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_settings(
        &dir,
        "rotator.toml",
        r#"
        [run]
        mode = "tor"
        rounds = 5

        [run.tor]
        manageService = false

        [[songs]]
        title = "Next Level"
        singer = "aespa"
        idx = 98765
        "#,
    );

    let document = config_for(&path).load_settings().unwrap();

    assert_eq!(document.run.mode, RunMode::Tor);
    assert_eq!(document.run.rounds, 5);
    assert!(!document.run.tor.manage_service);
    assert_eq!(document.songs[0].given_index(), Some(98765));
    clean_all_env_vars();
}

#[test]
#[serial]
fn test_env_overrides_applied_after_file() {
    clean_all_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_settings(&dir, "setting.macro.json", LEGACY_JSON);

    unsafe {
        env::set_var("ROTATOR_RETRIES", "4");
        env::set_var("ROTATOR_TIMEOUT_SEC", "3");
        env::set_var("ROTATOR_PROXY_LIMIT", "0");
        env::set_var("ROTATOR_SOCKS_PORT", "9150");
        env::set_var("ROTATOR_CATALOG_BASE_URL", "http://127.0.0.1:8081");
    }

    let document = config_for(&path).load_settings().unwrap();

    assert_eq!(document.run.retries, 4);
    assert_eq!(document.run.timeout_sec, 3);
    assert_eq!(document.run.proxy.limit, 0);
    assert_eq!(document.run.tor.socks_port, 9150);
    assert_eq!(document.run.catalog.base_url, "http://127.0.0.1:8081");
    clean_all_env_vars();
}

#[test]
#[serial]
fn test_invalid_env_override_rejected() {
    clean_all_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_settings(&dir, "setting.macro.json", LEGACY_JSON);

    unsafe {
        env::set_var("ROTATOR_RETRIES", "many");
    }

    let result = config_for(&path).load_settings();
    assert!(matches!(result, Err(ConfigError::EnvError(msg)) if msg.contains("ROTATOR_RETRIES")));
    clean_all_env_vars();
}

#[test]
#[serial]
fn test_cli_overrides_mode_and_rounds() {
    clean_all_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_settings(&dir, "setting.macro.json", LEGACY_JSON);

    let config = Config::from_args([
        "tj-request-rotator",
        "--config",
        path.to_str().unwrap(),
        "--mode",
        "tor",
        "--rounds",
        "7",
    ])
    .unwrap();
    let document = config.load_settings().unwrap();

    assert_eq!(document.run.mode, RunMode::Tor);
    assert_eq!(document.run.rounds, 7);
    clean_all_env_vars();
}

#[test]
#[serial]
fn test_mode_from_environment() {
    clean_all_env_vars();
    unsafe {
        env::set_var("ROTATOR_MODE", "all");
    }

    let config = Config::from_args(["tj-request-rotator"]).unwrap();
    assert_eq!(config.mode, Some(RunMode::All));
    clean_all_env_vars();
}

#[test]
#[serial]
fn test_delay_with_only_max_loads() {
    clean_all_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_settings(
        &dir,
        "setting.macro.json",
        r#"{"run": {"delayMs": {"max": 300}}, "songs": [{"title": "A", "singer": "B"}]}"#,
    );

    let document = config_for(&path).load_settings().unwrap();

    assert_eq!(document.run.delay_ms, DelayRange::new(400, 300));
    assert!(!document.run.delay_ms.is_valid());
    clean_all_env_vars();
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_inverted_delay_range_skips_pause() {
    clean_all_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_settings(
        &dir,
        "setting.macro.json",
        r#"{"run": {"delayMs": {"min": 1500, "max": 200}}, "songs": []}"#,
    );

    let app = App::from_config(&config_for(&path)).unwrap();
    let before = tokio::time::Instant::now();
    let slept = app.settings().delay_ms.pause().await;

    assert_eq!(slept, Duration::ZERO);
    assert_eq!(before.elapsed(), Duration::ZERO);
    clean_all_env_vars();
}

#[test]
#[serial]
fn test_null_mode_in_file_is_default() {
    clean_all_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_settings(
        &dir,
        "setting.macro.json",
        r#"{"run": {"mode": null, "retries": 2}, "songs": [{"title": "A", "singer": "B"}]}"#,
    );

    let document = config_for(&path).load_settings().unwrap();

    assert_eq!(document.run.mode, RunMode::None);
    assert_eq!(document.run.retries, 2);
    clean_all_env_vars();
}

#[test]
#[serial]
fn test_missing_file_is_file_error() {
    clean_all_env_vars();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");

    let result = config_for(&path).load_settings();
    assert!(matches!(result, Err(ConfigError::FileError { .. })));
}

#[test]
#[serial]
fn test_unknown_mode_in_file_is_other() {
    clean_all_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_settings(
        &dir,
        "setting.macro.json",
        r#"{"run": {"mode": "stealth"}, "songs": [{"title": "A", "singer": "B"}]}"#,
    );

    let document = config_for(&path).load_settings().unwrap();
    assert_eq!(document.run.mode, RunMode::Other);
}

#[test]
#[serial]
fn test_app_from_config_builds_production_wiring() {
    clean_all_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_settings(&dir, "setting.macro.json", LEGACY_JSON);

    let app = App::from_config(&config_for(&path)).unwrap();
    assert_eq!(app.settings().mode, RunMode::Proxy);
    assert_eq!(app.settings().delay_ms.max, 300);
}

#[test]
#[serial]
fn test_app_rejects_bad_catalog_url() {
    clean_all_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_settings(
        &dir,
        "setting.macro.json",
        r#"{"run": {"catalog": {"baseUrl": "::not-a-url"}}}"#,
    );

    let result = App::from_config(&config_for(&path));
    assert!(matches!(
        result,
        Err(RotatorError::Config(ConfigError::InvalidUrl(_)))
    ));
}

#[tokio::test]
#[serial]
async fn test_app_with_empty_song_list_exits_cleanly() {
    clean_all_env_vars();
    let dir = TempDir::new().unwrap();
    let path = write_settings(
        &dir,
        "setting.macro.json",
        r#"{"run": {"mode": "proxy"}, "songs": []}"#,
    );

    let app = App::from_config(&config_for(&path)).unwrap();
    let reports = app.run().await.into_result().unwrap();
    assert!(reports.is_empty());
}
