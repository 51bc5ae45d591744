//! Heuristic prober: one GET against the target and a handful of string
//! checks over what comes back.

pub mod checks;

use std::{fmt, str::FromStr, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, header::HeaderMap};
use scanweb_model::HeuristicResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, ScanError};

pub const DEFAULT_USER_AGENT: &str = "ScanWeb Security Scanner/1.0";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Produces a heuristic result for a target URL. Implementations never fail:
/// fetch problems are reported through [`HeuristicResult::error`].
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> HeuristicResult;
}

/// Which checklists the prober applies.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProbeProfile {
    Basic,
    #[default]
    Extended,
}

impl ProbeProfile {
    pub fn header_checklist(&self) -> &'static [&'static str] {
        match self {
            ProbeProfile::Basic => checks::BASIC_HEADERS,
            ProbeProfile::Extended => checks::EXTENDED_HEADERS,
        }
    }

    pub fn script_patterns(&self) -> &'static [&'static str] {
        match self {
            ProbeProfile::Basic => checks::BASIC_SCRIPT_PATTERNS,
            ProbeProfile::Extended => checks::EXTENDED_SCRIPT_PATTERNS,
        }
    }

    pub fn reports_disclosure(&self) -> bool {
        matches!(self, ProbeProfile::Extended)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeProfile::Basic => "basic",
            ProbeProfile::Extended => "extended",
        }
    }
}

impl fmt::Display for ProbeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProbeProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(ProbeProfile::Basic),
            "extended" => Ok(ProbeProfile::Extended),
            other => Err(format!(
                "unknown probe profile '{other}' (expected basic or extended)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub user_agent: String,
    pub timeout: Duration,
    pub profile: ProbeProfile,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_PROBE_TIMEOUT,
            profile: ProbeProfile::default(),
        }
    }
}

/// Response pieces the checks need.
#[derive(Debug)]
struct FetchedPage {
    headers: HeaderMap,
    body: String,
}

/// [`Prober`] backed by a reqwest client. The client carries no cookie store
/// and no default auth, so nothing from the caller reaches the target.
#[derive(Debug, Clone)]
pub struct HeuristicProber {
    client: Client,
    settings: ProbeSettings,
}

impl HeuristicProber {
    pub fn new(settings: ProbeSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                ScanError::Internal(format!("Failed to build probe client: {e}"))
            })?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScanError::Probe(e.to_string()))?;
        debug!(status = %response.status(), "target responded");

        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ScanError::Probe(e.to_string()))?;
        debug!(body_len = body.len(), "target body read");

        Ok(FetchedPage { headers, body })
    }

    fn analyze(&self, url: &str, page: &FetchedPage) -> HeuristicResult {
        let profile = self.settings.profile;
        HeuristicResult {
            missing_headers: checks::missing_headers(
                &page.headers,
                profile.header_checklist(),
            ),
            script_tags_found: checks::contains_script_patterns(
                &page.body,
                profile.script_patterns(),
            ),
            sqli_risk: checks::url_has_sqli_pattern(url),
            info_disclosure: profile
                .reports_disclosure()
                .then(|| checks::info_disclosure(&page.headers)),
            error: None,
        }
    }
}

#[async_trait]
impl Prober for HeuristicProber {
    async fn probe(&self, url: &str) -> HeuristicResult {
        match self.fetch(url).await {
            Ok(page) => self.analyze(url, &page),
            Err(ScanError::Probe(message)) => {
                warn!(url, error = %message, "probe request failed");
                HeuristicResult::failed(message)
            }
            Err(other) => {
                warn!(url, error = %other, "probe request failed");
                HeuristicResult::failed(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_parses_case_insensitively() {
        assert_eq!(
            "Basic".parse::<ProbeProfile>().unwrap(),
            ProbeProfile::Basic
        );
        assert_eq!(
            " extended ".parse::<ProbeProfile>().unwrap(),
            ProbeProfile::Extended
        );
        assert!("paranoid".parse::<ProbeProfile>().is_err());
    }

    #[test]
    fn default_settings_match_published_agent() {
        let settings = ProbeSettings::default();
        assert_eq!(settings.user_agent, "ScanWeb Security Scanner/1.0");
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.profile, ProbeProfile::Extended);
    }

    #[tokio::test]
    async fn unreachable_target_yields_error_result() {
        let prober = HeuristicProber::new(ProbeSettings {
            timeout: Duration::from_millis(500),
            ..ProbeSettings::default()
        })
        .unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = prober.probe(&format!("http://{addr}/")).await;
        assert!(result.is_error());
        assert!(result.missing_headers.is_empty());
        assert!(!result.script_tags_found);
        assert!(!result.sqli_risk);
        assert!(result.info_disclosure.is_none());
    }
}
