use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scanweb_model::{
    OwnerId, ScanId, ScanRecord, ScanStatus, Vulnerabilities,
};
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::{
    database::ports::scans::{NewScan, ScanCompletion, ScanRepository},
    error::{Result, ScanError},
};

const SCAN_COLUMNS: &str = "id, user_id, url, status, vulnerabilities, \
     ai_summary, scan_duration, created_at, completed_at";

#[derive(Clone, Debug)]
pub struct PostgresScanRepository {
    pool: PgPool,
}

impl PostgresScanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Explain why a conditional update touched no rows.
    async fn rejected_transition(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
        target: ScanStatus,
    ) -> ScanError {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM scans WHERE id = $1 AND user_id = $2)",
        )
        .bind(scan_id.to_uuid())
        .bind(owner_id.to_uuid())
        .fetch_one(self.pool())
        .await;

        match exists {
            Ok(true) => ScanError::StaleTransition { scan_id, target },
            Ok(false) => ScanError::NotFound(scan_id),
            Err(e) => ScanError::Persistence(format!(
                "Failed to inspect scan {scan_id}: {e}"
            )),
        }
    }
}

#[async_trait]
impl ScanRepository for PostgresScanRepository {
    async fn create(&self, scan: NewScan) -> Result<ScanRecord> {
        let row = sqlx::query_as::<_, ScanRow>(&format!(
            "INSERT INTO scans (id, user_id, url, status) \
             VALUES ($1, $2, $3, 'pending') RETURNING {SCAN_COLUMNS}"
        ))
        .bind(ScanId::new().to_uuid())
        .bind(scan.owner_id.to_uuid())
        .bind(&scan.url)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            ScanError::Persistence(format!("Failed to create scan: {}", e))
        })?;

        row.try_into()
    }

    async fn get(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
    ) -> Result<Option<ScanRecord>> {
        let row = sqlx::query_as::<_, ScanRow>(&format!(
            "SELECT {SCAN_COLUMNS} FROM scans WHERE id = $1 AND user_id = $2"
        ))
        .bind(scan_id.to_uuid())
        .bind(owner_id.to_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            ScanError::Persistence(format!("Failed to load scan: {}", e))
        })?;

        row.map(ScanRecord::try_from).transpose()
    }

    async fn list_for_owner(&self, owner_id: OwnerId) -> Result<Vec<ScanRecord>> {
        let rows = sqlx::query_as::<_, ScanRow>(&format!(
            "SELECT {SCAN_COLUMNS} FROM scans WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner_id.to_uuid())
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            ScanError::Persistence(format!("Failed to list scans: {}", e))
        })?;

        rows.into_iter().map(ScanRecord::try_from).collect()
    }

    async fn mark_scanning(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE scans SET status = 'scanning' \
             WHERE id = $1 AND user_id = $2 AND status = 'pending'",
        )
        .bind(scan_id.to_uuid())
        .bind(owner_id.to_uuid())
        .execute(self.pool())
        .await
        .map_err(|e| {
            ScanError::Persistence(format!("Failed to mark scan scanning: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(self
                .rejected_transition(scan_id, owner_id, ScanStatus::Scanning)
                .await);
        }
        Ok(())
    }

    async fn complete(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
        completion: ScanCompletion,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE scans SET status = 'completed', vulnerabilities = $3, \
             ai_summary = $4, scan_duration = $5, completed_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND status = 'scanning'",
        )
        .bind(scan_id.to_uuid())
        .bind(owner_id.to_uuid())
        .bind(completion.vulnerabilities.as_ref().map(Json))
        .bind(&completion.ai_summary)
        .bind(completion.scan_duration)
        .execute(self.pool())
        .await
        .map_err(|e| {
            ScanError::Persistence(format!("Failed to complete scan: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(self
                .rejected_transition(scan_id, owner_id, ScanStatus::Completed)
                .await);
        }
        Ok(())
    }

    async fn fail(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
        scan_duration: i32,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE scans SET status = 'failed', scan_duration = $3, \
             completed_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND status = 'scanning'",
        )
        .bind(scan_id.to_uuid())
        .bind(owner_id.to_uuid())
        .bind(scan_duration)
        .execute(self.pool())
        .await
        .map_err(|e| {
            ScanError::Persistence(format!("Failed to mark scan failed: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(self
                .rejected_transition(scan_id, owner_id, ScanStatus::Failed)
                .await);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(self.pool())
            .await
            .map_err(|e| {
                ScanError::Persistence(format!("Database ping failed: {}", e))
            })?;
        Ok(())
    }
}

// Database row type for scans
#[derive(sqlx::FromRow)]
struct ScanRow {
    id: Uuid,
    user_id: Uuid,
    url: String,
    status: String,
    vulnerabilities: Option<Json<Vulnerabilities>>,
    ai_summary: Option<String>,
    scan_duration: Option<i32>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<ScanRow> for ScanRecord {
    type Error = ScanError;

    fn try_from(row: ScanRow) -> Result<Self> {
        let status = row.status.parse::<ScanStatus>().map_err(|e| {
            ScanError::Persistence(format!("Scan {}: {}", row.id, e))
        })?;

        Ok(ScanRecord {
            id: ScanId(row.id),
            owner_id: OwnerId(row.user_id),
            url: row.url,
            status,
            vulnerabilities: row.vulnerabilities.map(|Json(v)| v),
            ai_summary: row.ai_summary,
            scan_duration: row.scan_duration,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}
