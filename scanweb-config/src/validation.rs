use thiserror::Error;
use url::Url;

use super::models::{Config, CorsConfig};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("DATABASE_URL is required when DEV_MODE is false")]
    MissingDatabase,
    #[error("CORS wildcard origins are not allowed when DEV_MODE is false")]
    DangerousCorsWildcard,
    #[error("invalid CORS configuration: {reason}")]
    InvalidCorsConfig { reason: String },
    #[error("invalid database pool size: min {min}, max {max}")]
    InvalidPoolSize { min: u32, max: u32 },
    #[error("invalid summarizer endpoint `{endpoint}`: {reason}")]
    InvalidSummarizerEndpoint { endpoint: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if !config.dev_mode {
        if config.database.url.is_none() {
            return Err(ConfigGuardRailError::MissingDatabase);
        }
        if config.cors.is_wildcard_included() {
            return Err(ConfigGuardRailError::DangerousCorsWildcard);
        }
    } else if config.database.url.is_none() {
        warnings.push_with_hint(
            "DATABASE_URL not configured; scans are kept in memory and lost on restart",
            "Set DATABASE_URL to persist scans in Postgres",
        );
    }

    let pool = &config.database;
    if pool.max_connections == 0 || pool.min_connections > pool.max_connections
    {
        return Err(ConfigGuardRailError::InvalidPoolSize {
            min: pool.min_connections,
            max: pool.max_connections,
        });
    }

    validate_cors(&config.cors)?;
    validate_summarizer_endpoint(&config.summarizer.endpoint)?;

    if let Some(deadline) = config.scanner.probe_deadline
        && deadline < config.scanner.probe_timeout
    {
        warnings.push_with_hint(
            format!(
                "SCANNER_PROBE_DEADLINE ({}) is shorter than SCANNER_PROBE_TIMEOUT ({})",
                humantime::format_duration(deadline),
                humantime::format_duration(config.scanner.probe_timeout),
            ),
            "Slow targets will be reported as probe timeouts before the request itself gives up",
        );
    }

    if config.summarizer.timeout.is_none() {
        warnings.push_with_hint(
            "Summarizer timeout disabled; scans wait for the summarizer indefinitely",
            "Set SUMMARIZER_TIMEOUT to bound the summary step",
        );
    }

    Ok(warnings)
}

fn validate_cors(cors: &CorsConfig) -> Result<(), ConfigGuardRailError> {
    for origin in &cors.allowed_origins {
        let origin = origin.trim();
        if origin == "*" {
            continue;
        }
        Url::parse(origin).map_err(|err| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!(
                    "invalid origin `{origin}` in CORS_ALLOWED_ORIGINS: {err}"
                ),
            }
        })?;
    }

    Ok(())
}

fn validate_summarizer_endpoint(
    endpoint: &str,
) -> Result<(), ConfigGuardRailError> {
    let invalid = |reason: String| {
        ConfigGuardRailError::InvalidSummarizerEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        }
    };

    let parsed = Url::parse(endpoint).map_err(|err| invalid(err.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme `{other}`"))),
    }
}
