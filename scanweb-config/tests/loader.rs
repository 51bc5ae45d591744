use std::{collections::HashMap, fs, time::Duration};

use scanweb_config::{
    ConfigGuardRailError, ConfigLoadError, ConfigLoader, EnvConfig, SubmitMode,
};
use scanweb_core::probe::ProbeProfile;
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> EnvConfig {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EnvConfig::from_lookup(|key| map.get(key).cloned())
}

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("scanweb.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn file_values_are_loaded() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
dev_mode = false

[server]
host = "127.0.0.1"
port = 8080

[database]
url = "postgres://scanweb@localhost/scanweb"

[scanner]
profile = "basic"
probe_deadline = "20s"
min_duration = "off"
submit_mode = "blocking"

[summarizer]
endpoint = "http://summaries.internal/api"
timeout = "5s"
"#,
    );

    let load = ConfigLoader::new()
        .with_env(env(&[]))
        .with_config_path(&path)
        .load()
        .unwrap();
    let config = load.config;

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(
        config.database.url.as_deref(),
        Some("postgres://scanweb@localhost/scanweb")
    );
    assert_eq!(config.scanner.profile, ProbeProfile::Basic);
    assert_eq!(config.scanner.probe_deadline, Some(Duration::from_secs(20)));
    assert_eq!(config.scanner.min_duration, None);
    assert_eq!(config.scanner.submit_mode, SubmitMode::Blocking);
    assert_eq!(config.summarizer.endpoint, "http://summaries.internal/api");
    assert_eq!(config.summarizer.timeout, Some(Duration::from_secs(5)));
    assert_eq!(config.metadata.config_path.as_deref(), Some(path.as_path()));
    assert!(load.warnings.is_empty());
}

#[test]
fn environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[server]
port = 8080

[database]
url = "postgres://file@localhost/scanweb"

[summarizer]
endpoint = "http://file.internal/"
"#,
    );

    let config = ConfigLoader::new()
        .with_env(env(&[
            ("SERVER_PORT", "9090"),
            ("DATABASE_URL", "postgres://env@localhost/scanweb"),
            ("SUMMARIZER_ENDPOINT", "http://env.internal/"),
            ("SCANNER_MIN_DURATION", "2s"),
        ]))
        .with_config_path(&path)
        .load()
        .unwrap()
        .config;

    assert_eq!(config.server.port, 9090);
    assert_eq!(
        config.database.url.as_deref(),
        Some("postgres://env@localhost/scanweb")
    );
    assert_eq!(config.summarizer.endpoint, "http://env.internal/");
    assert_eq!(config.scanner.min_duration, Some(Duration::from_secs(2)));
}

#[test]
fn defaults_apply_without_file_in_dev_mode() {
    let load = ConfigLoader::new()
        .with_env(env(&[("DEV_MODE", "true")]))
        .load()
        .unwrap();
    let config = load.config;

    assert!(config.dev_mode);
    assert_eq!(config.server.port, 3000);
    assert!(config.database.url.is_none());
    assert_eq!(config.scanner.profile, ProbeProfile::Extended);
    assert_eq!(config.scanner.probe_timeout, Duration::from_secs(10));
    assert_eq!(config.scanner.probe_deadline, Some(Duration::from_secs(15)));
    assert_eq!(config.scanner.min_duration, Some(Duration::from_secs(10)));
    assert_eq!(config.scanner.submit_mode, SubmitMode::Detached);

    let messages: Vec<_> =
        load.warnings.iter().map(|w| w.message.as_str()).collect();
    assert!(messages.iter().any(|m| m.contains("No scanweb.toml")));
    assert!(messages.iter().any(|m| m.contains("SUMMARIZER_ENDPOINT")));
    assert!(messages.iter().any(|m| m.contains("DATABASE_URL")));
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = ConfigLoader::new()
        .with_env(env(&[]))
        .with_config_path(dir.path().join("absent.toml"))
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
}

#[test]
fn config_path_from_environment_is_honored() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "dev_mode = true\n[server]\nport = 4100\n");

    let config = ConfigLoader::new()
        .with_env(env(&[("SCANWEB_CONFIG", path.to_str().unwrap())]))
        .load()
        .unwrap()
        .config;
    assert_eq!(config.server.port, 4100);
}

#[test]
fn malformed_toml_reports_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[server\nport = ");
    let err = ConfigLoader::new()
        .with_env(env(&[]))
        .with_config_path(&path)
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::Parse { .. }));
}

#[test]
fn invalid_duration_names_the_variable() {
    let err = ConfigLoader::new()
        .with_env(env(&[
            ("DEV_MODE", "1"),
            ("SCANNER_PROBE_TIMEOUT", "soon"),
        ]))
        .load()
        .unwrap_err();
    match err {
        ConfigLoadError::InvalidValue { key, .. } => {
            assert_eq!(key, "SCANNER_PROBE_TIMEOUT")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_submit_mode_is_rejected() {
    let err = ConfigLoader::new()
        .with_env(env(&[
            ("DEV_MODE", "1"),
            ("SCANNER_SUBMIT_MODE", "eventually"),
        ]))
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::InvalidValue {
            key: "SCANNER_SUBMIT_MODE",
            ..
        }
    ));
}

#[test]
fn production_without_database_fails_guard_rails() {
    let err = ConfigLoader::new()
        .with_env(env(&[("SUMMARIZER_ENDPOINT", "http://s.internal/")]))
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::MissingDatabase)
    ));
}

#[test]
fn pool_sizes_layer_env_over_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
dev_mode = true

[database]
max_connections = 25
min_connections = 2
"#,
    );

    let config = ConfigLoader::new()
        .with_env(env(&[("DB_MIN_CONNECTIONS", "4")]))
        .with_config_path(&path)
        .load()
        .unwrap()
        .config;

    assert_eq!(config.database.max_connections, 25);
    assert_eq!(config.database.min_connections, 4);
    assert_eq!(config.database.pool_settings().max_connections, 25);
}

#[test]
fn malformed_pool_size_names_the_variable() {
    let err = ConfigLoader::new()
        .with_env(env(&[("DEV_MODE", "1"), ("DB_MAX_CONNECTIONS", "lots")]))
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::InvalidValue {
            key: "DB_MAX_CONNECTIONS",
            ..
        }
    ));
}

#[test]
fn inverted_pool_bounds_fail_guard_rails() {
    let err = ConfigLoader::new()
        .with_env(env(&[
            ("DEV_MODE", "1"),
            ("DB_MAX_CONNECTIONS", "2"),
            ("DB_MIN_CONNECTIONS", "8"),
        ]))
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::InvalidPoolSize {
            min: 8,
            max: 2
        })
    ));
}
