//! Drives one scan through `scanning` to a terminal state.

use std::{fmt, sync::Arc, time::Duration};

use scanweb_model::{HeuristicResult, OwnerId, ScanId};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    database::ports::{ScanCompletion, ScanRepository},
    error::{Result, ScanError},
    findings::build_vulnerabilities,
    probe::Prober,
    summary::Summarizer,
};

pub const DEFAULT_PROBE_DEADLINE: Duration = Duration::from_secs(15);
pub const DEFAULT_MIN_DURATION: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Outer bound on the probe step. `None` trusts the prober's own timeout.
    pub probe_deadline: Option<Duration>,
    /// Completed runs are padded to at least this long before persisting.
    pub min_duration: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            probe_deadline: Some(DEFAULT_PROBE_DEADLINE),
            min_duration: Some(DEFAULT_MIN_DURATION),
        }
    }
}

/// How a run ended. Callers never need to act on it; it exists for logs and
/// tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanRunOutcome {
    Completed { findings: usize, scan_duration: i32 },
    Failed { reason: String },
    /// The record could not be moved to `scanning` and was left untouched.
    Aborted { reason: String },
}

#[derive(Clone)]
pub struct ScanOrchestrator {
    scans: Arc<dyn ScanRepository>,
    prober: Arc<dyn Prober>,
    summarizer: Arc<dyn Summarizer>,
    config: PipelineConfig,
}

impl fmt::Debug for ScanOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanOrchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn rounded_seconds(elapsed: Duration) -> i32 {
    elapsed.as_secs_f64().round() as i32
}

impl ScanOrchestrator {
    pub fn new(
        scans: Arc<dyn ScanRepository>,
        prober: Arc<dyn Prober>,
        summarizer: Arc<dyn Summarizer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            scans,
            prober,
            summarizer,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole pipeline for one scan. Never returns an error: every
    /// problem after the `scanning` transition ends as a `failed` record.
    #[instrument(skip(self, url), fields(scan_id = %scan_id, owner_id = %owner_id))]
    pub async fn run(
        &self,
        scan_id: ScanId,
        url: &str,
        owner_id: OwnerId,
    ) -> ScanRunOutcome {
        let started = Instant::now();

        if let Err(err) = self.scans.mark_scanning(scan_id, owner_id).await {
            error!(error = %err, "could not mark scan as scanning; aborting");
            return ScanRunOutcome::Aborted {
                reason: err.to_string(),
            };
        }
        info!(url, "scan started");

        match self.execute(scan_id, url, owner_id, started).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "scan failed");
                self.record_failure(scan_id, owner_id, started).await;
                ScanRunOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    async fn execute(
        &self,
        scan_id: ScanId,
        url: &str,
        owner_id: OwnerId,
        started: Instant,
    ) -> Result<ScanRunOutcome> {
        let results = self.probe(url).await?;
        if let Some(message) = &results.error {
            return Err(ScanError::Probe(message.clone()));
        }
        debug!(
            missing_headers = results.missing_headers.len(),
            script_tags_found = results.script_tags_found,
            sqli_risk = results.sqli_risk,
            "probe finished"
        );

        let ai_summary = self.summarizer.summarize(&results).await;
        let vulnerabilities = build_vulnerabilities(&results);
        let findings = vulnerabilities.as_ref().map_or(0, |v| v.len());

        if let Some(floor) = self.config.min_duration {
            let elapsed = started.elapsed();
            if elapsed < floor {
                debug!(
                    remaining_ms = (floor - elapsed).as_millis() as u64,
                    "padding scan to minimum duration"
                );
                tokio::time::sleep(floor - elapsed).await;
            }
        }
        let scan_duration = rounded_seconds(started.elapsed());

        self.scans
            .complete(
                scan_id,
                owner_id,
                ScanCompletion {
                    vulnerabilities,
                    ai_summary,
                    scan_duration,
                },
            )
            .await?;

        info!(findings, scan_duration, "scan completed");
        Ok(ScanRunOutcome::Completed {
            findings,
            scan_duration,
        })
    }

    async fn probe(&self, url: &str) -> Result<HeuristicResult> {
        match self.config.probe_deadline {
            None => Ok(self.prober.probe(url).await),
            Some(deadline) => tokio::time::timeout(deadline, self.prober.probe(url))
                .await
                .map_err(|_| {
                    ScanError::Probe(format!(
                        "probe exceeded deadline of {}s",
                        deadline.as_secs()
                    ))
                }),
        }
    }

    /// Best effort: a failure here is logged and dropped.
    async fn record_failure(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
        started: Instant,
    ) {
        let scan_duration = rounded_seconds(started.elapsed());
        if let Err(err) = self.scans.fail(scan_id, owner_id, scan_duration).await {
            warn!(error = %err, "could not record scan failure");
        }
    }
}
