use async_trait::async_trait;
use scanweb_model::{OwnerId, ScanId, ScanRecord, Vulnerabilities};

use crate::error::Result;

/// Input for creating a `pending` scan record.
#[derive(Debug, Clone)]
pub struct NewScan {
    pub owner_id: OwnerId,
    /// Already normalized target URL.
    pub url: String,
}

/// Fields written together when a scan completes.
#[derive(Debug, Clone)]
pub struct ScanCompletion {
    pub vulnerabilities: Option<Vulnerabilities>,
    pub ai_summary: String,
    pub scan_duration: i32,
}

/// Owner-scoped access to scan records. Every state-changing call is
/// conditional on the current status so a transition can only move forward;
/// a call that matches no eligible row yields
/// [`ScanError::StaleTransition`](crate::error::ScanError::StaleTransition)
/// or [`ScanError::NotFound`](crate::error::ScanError::NotFound).
#[async_trait]
pub trait ScanRepository: Send + Sync {
    async fn create(&self, scan: NewScan) -> Result<ScanRecord>;

    async fn get(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
    ) -> Result<Option<ScanRecord>>;

    /// Newest first.
    async fn list_for_owner(&self, owner_id: OwnerId) -> Result<Vec<ScanRecord>>;

    /// `pending -> scanning`.
    async fn mark_scanning(&self, scan_id: ScanId, owner_id: OwnerId)
    -> Result<()>;

    /// `scanning -> completed`, stamping `completed_at`.
    async fn complete(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
        completion: ScanCompletion,
    ) -> Result<()>;

    /// `scanning -> failed`, stamping `completed_at`. Vulnerabilities and
    /// summary stay unset.
    async fn fail(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
        scan_duration: i32,
    ) -> Result<()>;

    /// Cheap reachability check for health endpoints.
    async fn ping(&self) -> Result<()>;
}
