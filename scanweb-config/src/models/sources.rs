use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util::{parse_bool, parse_csv};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub scanner: FileScannerConfig,
    #[serde(default)]
    pub summarizer: FileSummarizerConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

/// Durations are humantime strings (`"15s"`, `"1m"`); `"off"` disables the
/// optional ones.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileScannerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_mode: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileSummarizerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// Environment-derived configuration values. Values that need validation
/// are kept raw so the loader can report which variable was malformed.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub db_max_connections: Option<String>,
    pub db_min_connections: Option<String>,
    pub dev_mode: Option<bool>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub scanner_user_agent: Option<String>,
    pub scanner_profile: Option<String>,
    pub scanner_probe_timeout: Option<String>,
    pub scanner_probe_deadline: Option<String>,
    pub scanner_min_duration: Option<String>,
    pub scanner_submit_mode: Option<String>,
    pub summarizer_endpoint: Option<String>,
    pub summarizer_timeout: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key).filter(|value| !value.trim().is_empty())
        };

        Self {
            config_path: non_empty("SCANWEB_CONFIG").map(PathBuf::from),
            server_host: non_empty("SERVER_HOST"),
            server_port: non_empty("SERVER_PORT")
                .and_then(|s| s.trim().parse().ok()),
            database_url: non_empty("DATABASE_URL"),
            db_max_connections: non_empty("DB_MAX_CONNECTIONS"),
            db_min_connections: non_empty("DB_MIN_CONNECTIONS"),
            dev_mode: non_empty("DEV_MODE").and_then(|raw| parse_bool(&raw)),
            cors_allowed_origins: non_empty("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_csv(&raw)),
            scanner_user_agent: non_empty("SCANNER_USER_AGENT"),
            scanner_profile: non_empty("SCANNER_PROFILE"),
            scanner_probe_timeout: non_empty("SCANNER_PROBE_TIMEOUT"),
            scanner_probe_deadline: non_empty("SCANNER_PROBE_DEADLINE"),
            scanner_min_duration: non_empty("SCANNER_MIN_DURATION"),
            scanner_submit_mode: non_empty("SCANNER_SUBMIT_MODE"),
            summarizer_endpoint: non_empty("SUMMARIZER_ENDPOINT"),
            summarizer_timeout: non_empty("SUMMARIZER_TIMEOUT"),
        }
    }
}
