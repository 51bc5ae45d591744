pub mod error;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use scanweb_core::probe::ProbeProfile;

use self::error::ConfigLoadError;
use crate::{
    models::{
        Config, ConfigMetadata, CorsConfig, DatabaseConfig, ScannerConfig,
        ServerConfig, SubmitMode, SummarizerConfig,
        sources::{EnvConfig, FileConfig},
    },
    util::{parse_duration, parse_optional_duration},
    validation::{self, ConfigWarnings},
};

const DEFAULT_CONFIG_LOCATIONS: &[&str] =
    &["scanweb.toml", "config/scanweb.toml"];

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Use these values instead of the process environment. No `.env` file is
    /// read when set.
    pub env: Option<EnvConfig>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.options.env = Some(env);
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let (env_config, env_file_loaded) = match &self.options.env {
            Some(env) => (env.clone(), false),
            None => {
                let loaded = self.load_env_file()?;
                (EnvConfig::gather(), loaded)
            }
        };

        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let (config, warnings) = compose_config(
            file_config,
            env_config,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        )?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        let result = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path),
            None => dotenvy::dotenv().map(|_| ()),
        };
        match result {
            Ok(()) => Ok(true),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let mut source = ConfigPathSource::default();

        if let Some(explicit) = &self.options.config_path {
            source.explicit = Some(explicit.clone());
        } else if let Some(from_env) = &env_config.config_path {
            source.env = Some(from_env.clone());
        } else {
            source.default = DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists());
        }

        let Some((path, provenance)) = source.resolved_path() else {
            return Ok((None, None));
        };

        if !path.exists() {
            if provenance.is_explicit() {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge the layers (environment over file over defaults) and apply the
/// guard rails.
fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if metadata.config_path.is_none() {
        warnings.push_with_hint(
            "No scanweb.toml detected; falling back to environment variables",
            "Create scanweb.toml or set SCANWEB_CONFIG to point at one",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        cors: file_cors,
        scanner: file_scanner,
        summarizer: file_summarizer,
        dev_mode: file_dev_mode,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| "0.0.0.0".to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(3000),
    };

    let database_defaults = DatabaseConfig::default();
    let database = DatabaseConfig {
        url: env
            .database_url
            .or(file_database.url)
            .filter(|url| !url.trim().is_empty()),
        max_connections: pool_size(
            "DB_MAX_CONNECTIONS",
            env.db_max_connections,
            file_database.max_connections,
            database_defaults.max_connections,
        )?,
        min_connections: pool_size(
            "DB_MIN_CONNECTIONS",
            env.db_min_connections,
            file_database.min_connections,
            database_defaults.min_connections,
        )?,
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_else(default_cors_origins),
    };

    let dev_mode = env.dev_mode.or(file_dev_mode).unwrap_or(false);

    let defaults = ScannerConfig::default();
    let scanner = ScannerConfig {
        user_agent: env
            .scanner_user_agent
            .or(file_scanner.user_agent)
            .unwrap_or(defaults.user_agent),
        profile: match env.scanner_profile.or(file_scanner.profile) {
            Some(raw) => raw.parse::<ProbeProfile>().map_err(|reason| {
                ConfigLoadError::InvalidValue {
                    key: "SCANNER_PROFILE",
                    reason,
                }
            })?,
            None => defaults.profile,
        },
        probe_timeout: required_duration(
            "SCANNER_PROBE_TIMEOUT",
            env.scanner_probe_timeout.or(file_scanner.probe_timeout),
            defaults.probe_timeout,
        )?,
        probe_deadline: optional_duration(
            "SCANNER_PROBE_DEADLINE",
            env.scanner_probe_deadline.or(file_scanner.probe_deadline),
            defaults.probe_deadline,
        )?,
        min_duration: optional_duration(
            "SCANNER_MIN_DURATION",
            env.scanner_min_duration.or(file_scanner.min_duration),
            defaults.min_duration,
        )?,
        submit_mode: match env.scanner_submit_mode.or(file_scanner.submit_mode)
        {
            Some(raw) => raw.parse::<SubmitMode>().map_err(|reason| {
                ConfigLoadError::InvalidValue {
                    key: "SCANNER_SUBMIT_MODE",
                    reason,
                }
            })?,
            None => defaults.submit_mode,
        },
    };

    let summarizer_defaults = SummarizerConfig::default();
    let endpoint = env.summarizer_endpoint.or(file_summarizer.endpoint);
    if endpoint.is_none() {
        warnings.push_with_hint(
            format!(
                "SUMMARIZER_ENDPOINT not configured; using {}",
                summarizer_defaults.endpoint
            ),
            "Point SUMMARIZER_ENDPOINT at the summary service; scans fall back to a stock summary when it is unreachable",
        );
    }
    let summarizer = SummarizerConfig {
        endpoint: endpoint.unwrap_or(summarizer_defaults.endpoint),
        timeout: optional_duration(
            "SUMMARIZER_TIMEOUT",
            env.summarizer_timeout.or(file_summarizer.timeout),
            summarizer_defaults.timeout,
        )?,
    };

    let config = Config {
        server,
        database,
        cors,
        dev_mode,
        scanner,
        summarizer,
        metadata,
    };

    let guard_warnings = validation::apply_guard_rails(&config)?;
    warnings.extend(guard_warnings);

    Ok((config, warnings))
}

fn required_duration(
    key: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    match raw {
        Some(raw) => parse_duration(&raw)
            .map_err(|reason| ConfigLoadError::InvalidValue { key, reason }),
        None => Ok(default),
    }
}

fn optional_duration(
    key: &'static str,
    raw: Option<String>,
    default: Option<Duration>,
) -> Result<Option<Duration>, ConfigLoadError> {
    match raw {
        Some(raw) => parse_optional_duration(&raw)
            .map_err(|reason| ConfigLoadError::InvalidValue { key, reason }),
        None => Ok(default),
    }
}

fn pool_size(
    key: &'static str,
    env_raw: Option<String>,
    file_value: Option<u32>,
    default: u32,
) -> Result<u32, ConfigLoadError> {
    match env_raw {
        Some(raw) => raw.trim().parse::<u32>().map_err(|err| {
            ConfigLoadError::InvalidValue {
                key,
                reason: format!("'{}' is not a connection count: {err}", raw.trim()),
            }
        }),
        None => Ok(file_value.unwrap_or(default)),
    }
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

#[derive(Debug, Default)]
struct ConfigPathSource {
    explicit: Option<PathBuf>,
    env: Option<PathBuf>,
    default: Option<PathBuf>,
}

impl ConfigPathSource {
    fn resolved_path(&self) -> Option<(PathBuf, ConfigPathProvenance)> {
        if let Some(path) = &self.explicit {
            return Some((path.clone(), ConfigPathProvenance::Explicit));
        }
        if let Some(path) = &self.env {
            return Some((path.clone(), ConfigPathProvenance::Env));
        }
        if let Some(path) = &self.default {
            return Some((path.clone(), ConfigPathProvenance::Default));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigPathProvenance {
    Explicit,
    Env,
    Default,
}

impl ConfigPathProvenance {
    fn is_explicit(self) -> bool {
        matches!(
            self,
            ConfigPathProvenance::Explicit | ConfigPathProvenance::Env
        )
    }
}
