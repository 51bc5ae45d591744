pub mod sources;

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use scanweb_core::{
    database::PoolSettings,
    orchestrator::PipelineConfig,
    probe::{DEFAULT_USER_AGENT, ProbeProfile, ProbeSettings},
    summary::SummarizerSettings,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub dev_mode: bool,
    pub scanner: ScannerConfig,
    pub summarizer: SummarizerConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `None` selects the in-memory store, which is only allowed in dev mode.
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let pool = PoolSettings::default();
        Self {
            url: None,
            max_connections: pool.max_connections,
            min_connections: pool.min_connections,
        }
    }
}

impl DatabaseConfig {
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.max_connections,
            min_connections: self.min_connections,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

/// How the submission endpoint runs the pipeline.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SubmitMode {
    /// Spawn the run and answer immediately; clients poll for the result.
    #[default]
    Detached,
    /// Answer only after the run reached a terminal state.
    Blocking,
}

impl SubmitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitMode::Detached => "detached",
            SubmitMode::Blocking => "blocking",
        }
    }
}

impl fmt::Display for SubmitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detached" => Ok(SubmitMode::Detached),
            "blocking" => Ok(SubmitMode::Blocking),
            other => Err(format!(
                "unknown submit mode '{other}' (expected detached or blocking)"
            )),
        }
    }
}

/// Scan pipeline tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    pub user_agent: String,
    pub profile: ProbeProfile,
    /// Timeout of the single probe request.
    pub probe_timeout: Duration,
    /// Outer bound on the probe step, `None` when disabled.
    pub probe_deadline: Option<Duration>,
    /// Minimum stored duration of completed scans, `None` when disabled.
    pub min_duration: Option<Duration>,
    pub submit_mode: SubmitMode,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        let pipeline = PipelineConfig::default();
        let probe = ProbeSettings::default();
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            profile: probe.profile,
            probe_timeout: probe.timeout,
            probe_deadline: pipeline.probe_deadline,
            min_duration: pipeline.min_duration,
            submit_mode: SubmitMode::default(),
        }
    }
}

impl ScannerConfig {
    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            user_agent: self.user_agent.clone(),
            timeout: self.probe_timeout,
            profile: self.profile,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            probe_deadline: self.probe_deadline,
            min_duration: self.min_duration,
        }
    }
}

pub const DEFAULT_SUMMARIZER_ENDPOINT: &str = "http://127.0.0.1:8787/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizerConfig {
    pub endpoint: String,
    pub timeout: Option<Duration>,
}

impl SummarizerConfig {
    pub fn settings(&self) -> SummarizerSettings {
        SummarizerSettings {
            endpoint: self.endpoint.clone(),
            timeout: self.timeout,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        let defaults = SummarizerSettings::new(DEFAULT_SUMMARIZER_ENDPOINT);
        Self {
            endpoint: defaults.endpoint,
            timeout: defaults.timeout,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
