//! Client for the remote summarization endpoint.

pub mod markdown;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scanweb_model::HeuristicResult;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, ScanError};

pub use markdown::{
    SUMMARY_PLACEHOLDER, SUMMARY_TIMED_OUT, SUMMARY_UNAVAILABLE,
    render_summary,
};

pub const DEFAULT_SUMMARY_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns heuristic results into human-readable text. Implementations never
/// fail; problems degrade to fixed fallback strings.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, results: &HeuristicResult) -> String;
}

#[derive(Debug, Clone)]
pub struct SummarizerSettings {
    pub endpoint: String,
    /// Upper bound on the whole exchange. `None` waits for the endpoint.
    pub timeout: Option<Duration>,
}

impl SummarizerSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Some(DEFAULT_SUMMARY_TIMEOUT),
        }
    }
}

#[derive(Serialize)]
struct SummaryRequest<'a> {
    results: &'a HeuristicResult,
}

#[derive(Debug, Clone)]
pub struct SummarizerClient {
    client: Client,
    settings: SummarizerSettings,
}

impl SummarizerClient {
    pub fn new(settings: SummarizerSettings) -> Result<Self> {
        let client = Client::builder().build().map_err(|e| {
            ScanError::Internal(format!(
                "Failed to build summarizer client: {e}"
            ))
        })?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &SummarizerSettings {
        &self.settings
    }

    /// Single POST to the endpoint, rendered to Markdown on success.
    pub async fn request_summary(
        &self,
        results: &HeuristicResult,
    ) -> Result<String> {
        let response = self
            .client
            .post(&self.settings.endpoint)
            .json(&SummaryRequest { results })
            .send()
            .await
            .map_err(|e| ScanError::Summary(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Summary(format!(
                "endpoint responded with status {status}"
            )));
        }

        let reply: Value = response
            .json()
            .await
            .map_err(|e| ScanError::Summary(e.to_string()))?;
        debug!("summary reply received");
        Ok(render_summary(&reply))
    }

    async fn summarize_untimed(&self, results: &HeuristicResult) -> String {
        match self.request_summary(results).await {
            Ok(markdown) => markdown,
            Err(err) => {
                warn!(error = %err, "falling back to placeholder summary");
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }
}

#[async_trait]
impl Summarizer for SummarizerClient {
    async fn summarize(&self, results: &HeuristicResult) -> String {
        let Some(limit) = self.settings.timeout else {
            return self.summarize_untimed(results).await;
        };

        // The request runs on its own task so losing the race detaches it
        // instead of cancelling it; its eventual output is dropped.
        let client = self.clone();
        let owned = results.clone();
        let request = tokio::spawn(async move {
            client.summarize_untimed(&owned).await
        });

        match tokio::time::timeout(limit, request).await {
            Ok(Ok(markdown)) => markdown,
            Ok(Err(join_err)) => {
                warn!(error = %join_err, "summary task aborted");
                SUMMARY_UNAVAILABLE.to_string()
            }
            Err(_) => {
                warn!(
                    timeout_ms = limit.as_millis() as u64,
                    "summary timed out"
                );
                SUMMARY_TIMED_OUT.to_string()
            }
        }
    }
}
