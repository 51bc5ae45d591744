//! Client-side completion tracking: re-read a scan until it is terminal.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use scanweb_model::{OwnerId, ScanId, ScanRecord, ScanStatus};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::{
    database::ports::ScanRepository,
    error::{Result, ScanError},
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Where the poller reads a scan from: the HTTP API for clients, a
/// repository for in-process callers.
#[async_trait]
pub trait ScanSource: Send + Sync {
    async fn fetch_scan(&self, scan_id: ScanId) -> Result<ScanRecord>;
}

/// A repository viewed through one owner's eyes.
#[derive(Clone)]
pub struct OwnedScans {
    scans: Arc<dyn ScanRepository>,
    owner_id: OwnerId,
}

impl OwnedScans {
    pub fn new(scans: Arc<dyn ScanRepository>, owner_id: OwnerId) -> Self {
        Self { scans, owner_id }
    }
}

impl fmt::Debug for OwnedScans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedScans")
            .field("owner_id", &self.owner_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ScanSource for OwnedScans {
    async fn fetch_scan(&self, scan_id: ScanId) -> Result<ScanRecord> {
        self.scans
            .get(scan_id, self.owner_id)
            .await?
            .ok_or(ScanError::NotFound(scan_id))
    }
}

/// Message shown once a watched scan completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionNotice {
    pub title: String,
    pub body: String,
}

impl CompletionNotice {
    pub const TITLE: &'static str = "ScanWeb Scan Complete!";

    /// `Some` only for completed scans.
    pub fn for_record(record: &ScanRecord) -> Option<Self> {
        if record.status != ScanStatus::Completed {
            return None;
        }

        let count = record.vulnerability_count();
        let body = match count {
            0 => "No vulnerabilities found - Your site looks secure!".to_string(),
            1 => "Found 1 vulnerability - View results now".to_string(),
            n => format!("Found {n} vulnerabilities - View results now"),
        };

        Some(Self {
            title: Self::TITLE.to_string(),
            body,
        })
    }
}

type Observer = Box<dyn Fn(&ScanRecord) + Send + Sync>;

pub struct ScanPoller<S: ?Sized> {
    source: Arc<S>,
    interval: Duration,
    observer: Option<Observer>,
}

impl<S: ?Sized> fmt::Debug for ScanPoller<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanPoller")
            .field("interval", &self.interval)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl<S> ScanPoller<S>
where
    S: ScanSource + ?Sized,
{
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            interval: DEFAULT_POLL_INTERVAL,
            observer: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Called with every successfully read view, terminal or not.
    pub fn with_observer(
        mut self,
        observer: impl Fn(&ScanRecord) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Read immediately, then every interval, until the scan is terminal.
    pub async fn watch(&self, scan_id: ScanId) -> ScanRecord {
        self.poll(scan_id, Instant::now()).await
    }

    /// Continue from a view the caller already holds. A terminal view is
    /// returned as-is; otherwise the first read happens one interval later.
    pub async fn follow(&self, initial: ScanRecord) -> ScanRecord {
        if initial.is_terminal() {
            return initial;
        }
        self.poll(initial.id, Instant::now() + self.interval).await
    }

    async fn poll(&self, scan_id: ScanId, first_tick: Instant) -> ScanRecord {
        let mut ticker = tokio::time::interval_at(first_tick, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let record = match self.source.fetch_scan(scan_id).await {
                Ok(record) => record,
                Err(err) => {
                    warn!(%scan_id, error = %err, "scan read failed; retrying next tick");
                    continue;
                }
            };

            debug!(%scan_id, status = %record.status, "scan polled");
            if let Some(observer) = &self.observer {
                observer(&record);
            }
            if record.is_terminal() {
                return record;
            }
        }
    }
}
